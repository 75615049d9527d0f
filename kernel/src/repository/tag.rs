use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::tag::Tag;

#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<Tag>>;
}

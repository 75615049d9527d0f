use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{id::UserId, user::User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>>;
    /// Recipients of office approval notifications.
    async fn find_admins(&self) -> AppResult<Vec<User>>;
}

use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    id::{OfficeId, UserId},
    list::PaginatedList,
    office::{
        event::{CreateOffice, DeleteOffice, UpdateOffice},
        Office, OfficeListOptions,
    },
};

#[async_trait]
pub trait OfficeRepository: Send + Sync {
    async fn create(&self, event: CreateOffice, owned_by: UserId) -> AppResult<OfficeId>;
    async fn find_all(&self, options: OfficeListOptions) -> AppResult<PaginatedList<Office>>;
    async fn find_by_id(&self, office_id: OfficeId) -> AppResult<Option<Office>>;
    /// Applies the partial update. Returns `true` when the edit touched a
    /// field that sends the office back to approval review.
    async fn update(&self, event: UpdateOffice) -> AppResult<bool>;
    async fn delete(&self, event: DeleteOffice) -> AppResult<()>;
}

use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{office::Office, reservation::Reservation, user::User};

/// Outbound notifications. Callers fire these after the triggering write
/// has committed; a delivery failure must never undo the write.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn office_pending_approval(&self, recipient: &User, office: &Office) -> AppResult<()>;
    async fn reservation_made(&self, recipient: &User, reservation: &Reservation)
        -> AppResult<()>;
    async fn host_reservation_made(
        &self,
        recipient: &User,
        reservation: &Reservation,
    ) -> AppResult<()>;
    async fn reservation_starting(
        &self,
        recipient: &User,
        reservation: &Reservation,
    ) -> AppResult<()>;
    async fn host_reservation_starting(
        &self,
        recipient: &User,
        reservation: &Reservation,
    ) -> AppResult<()>;
}

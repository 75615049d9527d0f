use async_trait::async_trait;
use chrono::NaiveDate;
use shared::error::AppResult;

use crate::model::{
    id::{ReservationId, UserId},
    list::PaginatedList,
    reservation::{event::CreateReservation, Reservation, ReservationListOptions},
};

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Books an office. Serialized per office so that the overlap check
    /// and the insert cannot interleave with a concurrent booking.
    async fn create(&self, event: CreateReservation) -> AppResult<Reservation>;
    async fn find_by_id(&self, reservation_id: ReservationId) -> AppResult<Option<Reservation>>;
    /// The visitor's own reservations.
    async fn find_for_user(
        &self,
        user_id: UserId,
        options: ReservationListOptions,
    ) -> AppResult<PaginatedList<Reservation>>;
    /// Reservations on offices the host owns.
    async fn find_for_host(
        &self,
        host_id: UserId,
        options: ReservationListOptions,
    ) -> AppResult<PaginatedList<Reservation>>;
    /// Active reservations starting on the given day, for the start-of-stay
    /// notifications.
    async fn find_starting_on(&self, date: NaiveDate) -> AppResult<Vec<Reservation>>;
}

use chrono::NaiveDate;
use derive_new::new;

use crate::model::id::{OfficeId, UserId};

#[derive(Debug, new)]
pub struct CreateReservation {
    pub office_id: OfficeId,
    pub reserved_by: UserId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

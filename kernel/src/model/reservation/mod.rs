pub mod event;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::model::{
    id::{OfficeId, ReservationId, UserId},
    image::Image,
};

/// Bookings of 28 days and longer qualify for the office's monthly
/// discount.
pub const MONTHLY_DISCOUNT_MIN_DAYS: i64 = 28;

#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: ReservationId,
    pub reserved_by: UserId,
    pub status: ReservationStatus,
    pub price: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub office: ReservationOffice,
}

/// The office summary embedded in reservation listings.
#[derive(Debug, Clone)]
pub struct ReservationOffice {
    pub office_id: OfficeId,
    pub title: String,
    pub lat: f64,
    pub lng: f64,
    pub address_line1: String,
    pub owned_by: UserId,
    pub featured_image: Option<Image>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReservationStatus {
    Active,
    Cancelled,
}

#[derive(Debug, Default)]
pub struct ReservationListOptions {
    pub office_id: Option<OfficeId>,
    /// Visitor filter, only meaningful for host listings.
    pub user_id: Option<UserId>,
    pub status: Option<ReservationStatus>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub page: i64,
    pub per_page: i64,
}

/// Whole days covered by a booking, inclusive of both endpoints.
pub fn reservation_days(start_date: NaiveDate, end_date: NaiveDate) -> i64 {
    (end_date - start_date).num_days() + 1
}

/// Total price for a booking. The monthly discount applies as a whole
/// percentage off the total, using integer arithmetic.
pub fn reservation_price(days: i64, price_per_day: i64, monthly_discount: i64) -> i64 {
    let total = days * price_per_day;
    if days >= MONTHLY_DISCOUNT_MIN_DAYS && monthly_discount > 0 {
        total - total * monthly_discount / 100
    } else {
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn days_are_inclusive_of_both_endpoints() {
        assert_eq!(reservation_days(date("2024-06-01"), date("2024-06-02")), 2);
        assert_eq!(reservation_days(date("2024-06-01"), date("2024-07-10")), 40);
    }

    #[test]
    fn forty_days_with_ten_percent_monthly_discount() {
        assert_eq!(reservation_price(40, 1_000, 10), 36_000);
    }

    #[test]
    fn short_bookings_never_get_the_discount() {
        assert_eq!(reservation_price(27, 1_000, 10), 27_000);
    }

    #[test]
    fn the_discount_kicks_in_at_twenty_eight_days() {
        assert_eq!(reservation_price(28, 1_000, 10), 25_200);
    }

    #[test]
    fn a_zero_discount_leaves_the_total_untouched() {
        assert_eq!(reservation_price(40, 1_000, 0), 40_000);
    }

    #[test]
    fn reservation_status_uses_snake_case_storage_names() {
        assert_eq!(ReservationStatus::Active.as_ref(), "active");
        assert_eq!(
            "cancelled".parse::<ReservationStatus>().unwrap(),
            ReservationStatus::Cancelled
        );
    }
}

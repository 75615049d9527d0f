use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use kernel::model::{
    id::{ImageId, OfficeId, ReservationId, UserId},
    image::Image,
    reservation::{Reservation, ReservationOffice, ReservationStatus},
};
use shared::error::AppError;

#[derive(sqlx::FromRow)]
pub struct ReservationRow {
    pub reservation_id: ReservationId,
    pub user_id: UserId,
    pub status: String,
    pub price: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub office_id: OfficeId,
    pub office_title: String,
    pub office_lat: f64,
    pub office_lng: f64,
    pub office_address_line1: String,
    pub office_owned_by: UserId,
    pub featured_image_id: Option<ImageId>,
    pub featured_image_path: Option<String>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = AppError;

    fn try_from(value: ReservationRow) -> Result<Self, Self::Error> {
        let ReservationRow {
            reservation_id,
            user_id,
            status,
            price,
            start_date,
            end_date,
            created_at,
            office_id,
            office_title,
            office_lat,
            office_lng,
            office_address_line1,
            office_owned_by,
            featured_image_id,
            featured_image_path,
        } = value;
        let featured_image = match (featured_image_id, featured_image_path) {
            (Some(id), Some(path)) => Some(Image { id, path }),
            _ => None,
        };
        Ok(Reservation {
            id: reservation_id,
            reserved_by: user_id,
            status: ReservationStatus::from_str(&status)
                .map_err(|e| AppError::ConversionEntityError(e.to_string()))?,
            price,
            start_date,
            end_date,
            created_at,
            office: ReservationOffice {
                office_id,
                title: office_title,
                lat: office_lat,
                lng: office_lng,
                address_line1: office_address_line1,
                owned_by: office_owned_by,
                featured_image,
            },
        })
    }
}

#[derive(sqlx::FromRow)]
pub struct PaginatedReservationRow {
    pub total: i64,
    pub reservation_id: ReservationId,
}

/// The pricing fields read inside the booking critical section.
#[derive(sqlx::FromRow)]
pub struct BookingOfficeRow {
    pub price_per_day: i64,
    pub monthly_discount: i64,
}

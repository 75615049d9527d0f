use chrono::{NaiveDate, Utc};
use garde::Validate;
use kernel::model::{
    id::{OfficeId, ReservationId, UserId},
    reservation::{Reservation, ReservationListOptions, ReservationOffice, ReservationStatus},
};
use serde::{Deserialize, Serialize};

use crate::model::{image::ImageResponse, office::default_page};

/// Fixed page size of the reservation listings.
pub(crate) const PER_PAGE: i64 = 15;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    #[garde(skip)]
    pub office_id: OfficeId,
    #[garde(custom(date_after_today))]
    pub start_date: NaiveDate,
    #[garde(skip)]
    pub end_date: NaiveDate,
}

fn date_after_today(value: &NaiveDate, _ctx: &()) -> garde::Result {
    if *value <= Utc::now().date_naive() {
        return Err(garde::Error::new(
            "The start date must be a date after today.",
        ));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReservationListQuery {
    #[garde(range(min = 1))]
    #[serde(default = "default_page")]
    pub page: i64,
    #[garde(skip)]
    pub office_id: Option<OfficeId>,
    /// Visitor filter; only honored on the host listing.
    #[garde(skip)]
    pub user_id: Option<UserId>,
    #[garde(skip)]
    pub status: Option<ReservationStatus>,
    #[garde(skip)]
    pub from_date: Option<NaiveDate>,
    #[garde(skip)]
    pub to_date: Option<NaiveDate>,
}

impl ReservationListQuery {
    pub fn into_options(self, honor_user_filter: bool) -> ReservationListOptions {
        let ReservationListQuery {
            page,
            office_id,
            user_id,
            status,
            from_date,
            to_date,
        } = self;
        ReservationListOptions {
            office_id,
            user_id: if honor_user_filter { user_id } else { None },
            status,
            from_date,
            to_date,
            page,
            per_page: PER_PAGE,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub id: ReservationId,
    pub user_id: UserId,
    pub office_id: OfficeId,
    pub status: ReservationStatus,
    pub price: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub office: ReservationOfficeResponse,
}

impl From<Reservation> for ReservationResponse {
    fn from(value: Reservation) -> Self {
        let Reservation {
            id,
            reserved_by,
            status,
            price,
            start_date,
            end_date,
            created_at: _,
            office,
        } = value;
        Self {
            id,
            user_id: reserved_by,
            office_id: office.office_id,
            status,
            price,
            start_date,
            end_date,
            office: office.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationOfficeResponse {
    pub id: OfficeId,
    pub title: String,
    pub lat: f64,
    pub lng: f64,
    pub address_line1: String,
    pub featured_image: Option<ImageResponse>,
}

impl From<ReservationOffice> for ReservationOfficeResponse {
    fn from(value: ReservationOffice) -> Self {
        let ReservationOffice {
            office_id,
            title,
            lat,
            lng,
            address_line1,
            owned_by: _,
            featured_image,
        } = value;
        Self {
            id: office_id,
            title,
            lat,
            lng,
            address_line1,
            featured_image: featured_image.map(ImageResponse::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Days;

    use super::*;

    fn request(start: NaiveDate, end: NaiveDate) -> CreateReservationRequest {
        CreateReservationRequest {
            office_id: OfficeId::new(),
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn a_booking_cannot_start_today() {
        let today = Utc::now().date_naive();
        let req = request(today, today.checked_add_days(Days::new(3)).unwrap());
        assert!(req.validate(&()).is_err());
    }

    #[test]
    fn a_booking_starting_tomorrow_passes_validation() {
        let tomorrow = Utc::now().date_naive().checked_add_days(Days::new(1)).unwrap();
        let req = request(tomorrow, tomorrow.checked_add_days(Days::new(1)).unwrap());
        assert!(req.validate(&()).is_ok());
    }

    #[test]
    fn the_user_filter_is_dropped_on_the_visitor_listing() {
        let query = ReservationListQuery {
            page: 1,
            office_id: None,
            user_id: Some(UserId::new()),
            status: None,
            from_date: None,
            to_date: None,
        };
        assert!(query.into_options(false).user_id.is_none());
    }

    #[test]
    fn status_deserializes_from_its_snake_case_name() {
        let status: ReservationStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, ReservationStatus::Cancelled);
    }
}

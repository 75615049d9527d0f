use std::str::FromStr;

use kernel::model::{
    id::{ImageId, OfficeId, UserId},
    image::Image,
    office::{ApprovalStatus, Office},
    tag::Tag,
    user::OfficeOwner,
};
use shared::error::{AppError, AppResult};

#[derive(sqlx::FromRow)]
pub struct OfficeRow {
    pub office_id: OfficeId,
    pub title: String,
    pub description: String,
    pub lat: f64,
    pub lng: f64,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub approval_status: String,
    pub hidden: bool,
    pub price_per_day: i64,
    pub monthly_discount: i64,
    pub featured_image_id: Option<ImageId>,
    pub owned_by: UserId,
    pub owner_name: String,
    pub reservations_count: i64,
}

impl OfficeRow {
    pub fn into_office(self, tags: Vec<Tag>, images: Vec<Image>) -> AppResult<Office> {
        let OfficeRow {
            office_id,
            title,
            description,
            lat,
            lng,
            address_line1,
            address_line2,
            approval_status,
            hidden,
            price_per_day,
            monthly_discount,
            featured_image_id,
            owned_by,
            owner_name,
            reservations_count,
        } = self;
        Ok(Office {
            id: office_id,
            title,
            description,
            lat,
            lng,
            address_line1,
            address_line2,
            approval_status: ApprovalStatus::from_str(&approval_status)
                .map_err(|e| AppError::ConversionEntityError(e.to_string()))?,
            hidden,
            price_per_day,
            monthly_discount,
            featured_image_id,
            owner: OfficeOwner {
                owner_id: owned_by,
                owner_name,
            },
            tags,
            images,
            reservations_count,
        })
    }
}

/// First step of the two-step paginated listing: the filtered, ordered page
/// of ids together with the window total.
#[derive(sqlx::FromRow)]
pub struct PaginatedOfficeRow {
    pub total: i64,
    pub office_id: OfficeId,
}

/// The slice of an office the update path needs for merging a partial edit
/// and deciding whether it goes back to review.
#[derive(sqlx::FromRow)]
pub struct OfficeUpdateRow {
    pub owned_by: UserId,
    pub title: String,
    pub description: String,
    pub lat: f64,
    pub lng: f64,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub approval_status: String,
    pub hidden: bool,
    pub price_per_day: i64,
    pub monthly_discount: i64,
    pub featured_image_id: Option<ImageId>,
}

pub mod event;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::model::{
    id::{ImageId, OfficeId, TagId, UserId},
    image::Image,
    tag::Tag,
    user::OfficeOwner,
};

#[derive(Debug, Clone)]
pub struct Office {
    pub id: OfficeId,
    pub title: String,
    pub description: String,
    pub lat: f64,
    pub lng: f64,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub approval_status: ApprovalStatus,
    pub hidden: bool,
    pub price_per_day: i64,
    pub monthly_discount: i64,
    pub featured_image_id: Option<ImageId>,
    pub owner: OfficeOwner,
    pub tags: Vec<Tag>,
    pub images: Vec<Image>,
    pub reservations_count: i64,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
}

/// Filters and ordering for the public office listing.
#[derive(Debug, Default)]
pub struct OfficeListOptions {
    pub owner_id: Option<UserId>,
    pub visitor_id: Option<UserId>,
    pub tag_ids: Vec<TagId>,
    pub point: Option<GeoPoint>,
    /// Lifts the approved/non-hidden scope when the requester queries
    /// their own offices.
    pub include_unlisted: bool,
    pub page: i64,
    pub per_page: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_status_uses_snake_case_storage_names() {
        assert_eq!(ApprovalStatus::Pending.as_ref(), "pending");
        assert_eq!(
            "approved".parse::<ApprovalStatus>().unwrap(),
            ApprovalStatus::Approved
        );
        assert!("rejected".parse::<ApprovalStatus>().is_err());
    }
}

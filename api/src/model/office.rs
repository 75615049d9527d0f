use derive_new::new;
use garde::Validate;
use kernel::model::{
    id::{ImageId, OfficeId, TagId, UserId},
    office::{
        event::{CreateOffice, UpdateOffice},
        ApprovalStatus, GeoPoint, Office, OfficeListOptions,
    },
};
use serde::{Deserialize, Serialize};

use crate::model::{image::ImageResponse, tag::TagResponse, user::OfficeOwnerResponse};

/// Fixed page size of the office listing.
pub(crate) const PER_PAGE: i64 = 10;

pub(crate) fn default_page() -> i64 {
    1
}

#[derive(Debug, Deserialize, Validate)]
pub struct OfficeListQuery {
    #[garde(range(min = 1))]
    #[serde(default = "default_page")]
    pub page: i64,
    /// Owner filter.
    #[garde(skip)]
    pub user_id: Option<UserId>,
    /// Offices a given user has reserved.
    #[garde(skip)]
    pub visitor_id: Option<UserId>,
    #[garde(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[garde(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,
    #[garde(skip)]
    #[serde(default)]
    pub tags: Vec<TagId>,
}

impl OfficeListQuery {
    /// Owners browsing their own listings also see hidden and pending
    /// offices; everyone else gets the public scope.
    pub fn into_options(self, requester: Option<UserId>) -> OfficeListOptions {
        let OfficeListQuery {
            page,
            user_id,
            visitor_id,
            lat,
            lng,
            tags,
        } = self;
        let include_unlisted = matches!((requester, user_id), (Some(me), Some(owner)) if me == owner);
        let point = match (lat, lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        };
        OfficeListOptions {
            owner_id: user_id,
            visitor_id,
            tag_ids: tags,
            point,
            include_unlisted,
            page,
            per_page: PER_PAGE,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfficeRequest {
    #[garde(length(min = 1))]
    pub title: String,
    #[garde(length(min = 1))]
    pub description: String,
    #[garde(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[garde(range(min = -180.0, max = 180.0))]
    pub lng: f64,
    #[garde(length(min = 1))]
    pub address_line1: String,
    #[garde(skip)]
    pub address_line2: Option<String>,
    #[garde(skip)]
    #[serde(default)]
    pub hidden: bool,
    #[garde(range(min = 100))]
    pub price_per_day: i64,
    #[garde(range(min = 0, max = 100))]
    #[serde(default)]
    pub monthly_discount: i64,
    #[garde(skip)]
    #[serde(default)]
    pub tags: Vec<TagId>,
}

impl From<CreateOfficeRequest> for CreateOffice {
    fn from(value: CreateOfficeRequest) -> Self {
        let CreateOfficeRequest {
            title,
            description,
            lat,
            lng,
            address_line1,
            address_line2,
            hidden,
            price_per_day,
            monthly_discount,
            tags,
        } = value;
        CreateOffice {
            title,
            description,
            lat,
            lng,
            address_line1,
            address_line2,
            hidden,
            price_per_day,
            monthly_discount,
            tags,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOfficeRequest {
    #[garde(inner(length(min = 1)))]
    pub title: Option<String>,
    #[garde(inner(length(min = 1)))]
    pub description: Option<String>,
    #[garde(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[garde(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,
    #[garde(inner(length(min = 1)))]
    pub address_line1: Option<String>,
    #[garde(skip)]
    pub address_line2: Option<String>,
    #[garde(skip)]
    pub hidden: Option<bool>,
    #[garde(range(min = 100))]
    pub price_per_day: Option<i64>,
    #[garde(range(min = 0, max = 100))]
    pub monthly_discount: Option<i64>,
    #[garde(skip)]
    pub featured_image_id: Option<ImageId>,
    #[garde(skip)]
    pub tags: Option<Vec<TagId>>,
}

#[derive(new)]
pub struct UpdateOfficeRequestWithIds(OfficeId, UserId, UpdateOfficeRequest);

impl From<UpdateOfficeRequestWithIds> for UpdateOffice {
    fn from(value: UpdateOfficeRequestWithIds) -> Self {
        let UpdateOfficeRequestWithIds(
            office_id,
            requested_user,
            UpdateOfficeRequest {
                title,
                description,
                lat,
                lng,
                address_line1,
                address_line2,
                hidden,
                price_per_day,
                monthly_discount,
                featured_image_id,
                tags,
            },
        ) = value;
        UpdateOffice {
            office_id,
            requested_user,
            title,
            description,
            lat,
            lng,
            address_line1,
            address_line2,
            hidden,
            price_per_day,
            monthly_discount,
            featured_image_id,
            tags,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeResponse {
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
    pub user: OfficeOwnerResponse,
    pub tags: Vec<TagResponse>,
    pub images: Vec<ImageResponse>,
    pub reservations_count: i64,
}

impl From<Office> for OfficeResponse {
    fn from(value: Office) -> Self {
        let Office {
            id,
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
            owner,
            tags,
            images,
            reservations_count,
        } = value;
        Self {
            id,
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
            user: owner.into(),
            tags: tags.into_iter().map(TagResponse::from).collect(),
            images: images.into_iter().map(ImageResponse::from).collect(),
            reservations_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(user_id: Option<UserId>) -> OfficeListQuery {
        OfficeListQuery {
            page: 1,
            user_id,
            visitor_id: None,
            lat: None,
            lng: None,
            tags: vec![],
        }
    }

    #[test]
    fn owners_querying_themselves_see_unlisted_offices() {
        let me = UserId::new();
        let options = query(Some(me)).into_options(Some(me));
        assert!(options.include_unlisted);
    }

    #[test]
    fn strangers_only_see_the_public_scope() {
        let owner = UserId::new();
        let someone_else = UserId::new();
        assert!(!query(Some(owner)).into_options(Some(someone_else)).include_unlisted);
        assert!(!query(Some(owner)).into_options(None).include_unlisted);
        assert!(!query(None).into_options(Some(someone_else)).include_unlisted);
    }

    #[test]
    fn coordinates_only_count_as_a_pair() {
        let mut q = query(None);
        q.lat = Some(10.0);
        assert!(q.into_options(None).point.is_none());

        let mut q = query(None);
        q.lat = Some(10.0);
        q.lng = Some(20.0);
        let point = q.into_options(None).point.unwrap();
        assert_eq!(point.lat, 10.0);
        assert_eq!(point.lng, 20.0);
    }

    #[test]
    fn the_price_floor_is_enforced() {
        let req = CreateOfficeRequest {
            title: "Office".into(),
            description: "desc".into(),
            lat: 0.0,
            lng: 0.0,
            address_line1: "addr".into(),
            address_line2: None,
            hidden: false,
            price_per_day: 99,
            monthly_discount: 0,
            tags: vec![],
        };
        assert!(req.validate(&()).is_err());
    }
}

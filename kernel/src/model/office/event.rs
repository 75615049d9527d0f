use crate::model::id::{ImageId, OfficeId, TagId, UserId};

pub struct CreateOffice {
    pub title: String,
    pub description: String,
    pub lat: f64,
    pub lng: f64,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub hidden: bool,
    pub price_per_day: i64,
    pub monthly_discount: i64,
    pub tags: Vec<TagId>,
}

#[derive(Debug)]
pub struct UpdateOffice {
    pub office_id: OfficeId,
    pub requested_user: UserId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub hidden: Option<bool>,
    pub price_per_day: Option<i64>,
    pub monthly_discount: Option<i64>,
    pub featured_image_id: Option<ImageId>,
    pub tags: Option<Vec<TagId>>,
}

#[derive(Debug)]
pub struct DeleteOffice {
    pub office_id: OfficeId,
    pub requested_user: UserId,
}

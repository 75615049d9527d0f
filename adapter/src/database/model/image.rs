use kernel::model::{
    id::{ImageId, OfficeId},
    image::Image,
};

#[derive(sqlx::FromRow)]
pub struct OfficeImageRow {
    pub image_id: ImageId,
    pub office_id: OfficeId,
    pub path: String,
}

impl From<OfficeImageRow> for Image {
    fn from(value: OfficeImageRow) -> Self {
        let OfficeImageRow { image_id, path, .. } = value;
        Image { id: image_id, path }
    }
}

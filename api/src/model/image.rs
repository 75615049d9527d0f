use kernel::model::{id::ImageId, image::Image};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub id: ImageId,
    pub path: String,
}

impl From<Image> for ImageResponse {
    fn from(value: Image) -> Self {
        let Image { id, path } = value;
        Self { id, path }
    }
}

use crate::model::id::ImageId;

#[derive(Debug, Clone)]
pub struct Image {
    pub id: ImageId,
    pub path: String,
}

use kernel::model::{id::TagId, tag::Tag};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: TagId,
    pub name: String,
}

impl From<Tag> for TagResponse {
    fn from(value: Tag) -> Self {
        let Tag { id, name } = value;
        Self { id, name }
    }
}

#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub data: Vec<TagResponse>,
}

impl From<Vec<Tag>> for TagsResponse {
    fn from(value: Vec<Tag>) -> Self {
        Self {
            data: value.into_iter().map(TagResponse::from).collect(),
        }
    }
}

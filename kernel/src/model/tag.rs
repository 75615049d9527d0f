use crate::model::id::TagId;

#[derive(Debug, Clone)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

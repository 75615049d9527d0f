use kernel::model::{
    id::{OfficeId, TagId},
    tag::Tag,
};

#[derive(sqlx::FromRow)]
pub struct TagRow {
    pub tag_id: TagId,
    pub name: String,
}

impl From<TagRow> for Tag {
    fn from(value: TagRow) -> Self {
        let TagRow { tag_id, name } = value;
        Tag { id: tag_id, name }
    }
}

/// A tag joined through the office/tag pivot, keyed so rows can be grouped
/// back onto their offices.
#[derive(sqlx::FromRow)]
pub struct OfficeTagRow {
    pub office_id: OfficeId,
    pub tag_id: TagId,
    pub name: String,
}

impl From<OfficeTagRow> for Tag {
    fn from(value: OfficeTagRow) -> Self {
        let OfficeTagRow { tag_id, name, .. } = value;
        Tag { id: tag_id, name }
    }
}

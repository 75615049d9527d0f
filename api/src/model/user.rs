use kernel::model::{id::UserId, user::OfficeOwner};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeOwnerResponse {
    pub id: UserId,
    pub name: String,
}

impl From<OfficeOwner> for OfficeOwnerResponse {
    fn from(value: OfficeOwner) -> Self {
        let OfficeOwner {
            owner_id,
            owner_name,
        } = value;
        Self {
            id: owner_id,
            name: owner_name,
        }
    }
}

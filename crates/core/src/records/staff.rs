use crate::constants::STAFF_COLLECTION;
use crate::roles::{Category, Role};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wardview_types::{NonEmptyText, RecordId};

/// A registered member of staff. Stored in `staff`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StaffMember {
    /// Identifier such as `S001`.
    pub id: RecordId,
    pub full_name: NonEmptyText,
    pub role: Role,
    pub department: NonEmptyText,
    #[serde(default)]
    pub contact: Option<String>,
    pub registered_date: NaiveDate,
}

impl_record!(StaffMember, STAFF_COLLECTION, Category::Staff, "S", 3);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_role() {
        let json = r#"{"id":"S001","fullName":"Grace Mensah","role":"Surgeon","department":"Theatre","registeredDate":"2024-01-10"}"#;
        assert!(serde_json::from_str::<StaffMember>(json).is_err());
    }
}

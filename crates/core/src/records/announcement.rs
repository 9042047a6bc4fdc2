//! Hospital-wide announcements.
//!
//! An announcement names the audiences that may see it. The stored form is a
//! flat list of strings, each either a role name or `"All"`.

use crate::constants::ANNOUNCEMENTS_COLLECTION;
use crate::roles::{Category, Role};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use wardview_types::{NonEmptyText, RecordId};

/// Who an announcement is addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Audience {
    All,
    Role(Role),
}

impl Audience {
    pub fn as_str(self) -> &'static str {
        match self {
            Audience::All => "All",
            Audience::Role(role) => role.as_str(),
        }
    }

    pub fn includes(self, role: Role) -> bool {
        match self {
            Audience::All => true,
            Audience::Role(r) => r == role,
        }
    }
}

impl Serialize for Audience {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Audience {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().eq_ignore_ascii_case("all") {
            return Ok(Audience::All);
        }
        Role::parse(&raw)
            .map(Audience::Role)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown audience '{raw}'")))
    }
}

/// A notice shown on the announcements page and the overview banner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Announcement {
    pub id: RecordId,
    pub title: NonEmptyText,
    pub description: NonEmptyText,
    pub date: NaiveDate,
    pub visible_to: Vec<Audience>,
}

impl Announcement {
    /// Whether a session with `role` may see this announcement.
    pub fn visible_to_role(&self, role: Role) -> bool {
        self.visible_to.iter().any(|a| a.includes(role))
    }
}

impl_record!(Announcement, ANNOUNCEMENTS_COLLECTION, Category::Announcements, "ANN-", 4);

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Announcement {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn all_reaches_every_role() {
        let a = parse(
            r#"{"id":"ANN-0001","title":"Fire drill","description":"Friday 10:00","date":"2024-03-01","visibleTo":["All"]}"#,
        );
        for role in Role::ALL {
            assert!(a.visible_to_role(role));
        }
    }

    #[test]
    fn role_audience_is_exclusive() {
        let a = parse(
            r#"{"id":"ANN-0002","title":"Formulary update","description":"New antibiotics list","date":"2024-03-01","visibleTo":["Pharmacist","Physician"]}"#,
        );
        assert!(a.visible_to_role(Role::Pharmacist));
        assert!(a.visible_to_role(Role::Physician));
        assert!(!a.visible_to_role(Role::Nurse));
        assert!(!a.visible_to_role(Role::Patient));
    }

    #[test]
    fn empty_audience_is_visible_to_nobody() {
        let a = parse(
            r#"{"id":"ANN-0003","title":"Draft","description":"Unpublished","date":"2024-03-01","visibleTo":[]}"#,
        );
        assert!(Role::ALL.iter().all(|r| !a.visible_to_role(*r)));
    }

    #[test]
    fn audience_round_trips_as_plain_strings() {
        let json = serde_json::to_string(&vec![Audience::All, Audience::Role(Role::LabTech)]).unwrap();
        assert_eq!(json, r#"["All","LabTech"]"#);
    }
}

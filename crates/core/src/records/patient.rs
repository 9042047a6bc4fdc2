use super::Attachable;
use crate::constants::PATIENTS_COLLECTION;
use crate::roles::Category;
use serde::{Deserialize, Serialize};
use wardview_files::FileHandle;
use wardview_types::{NonEmptyText, RecordId};

/// Admission state of a patient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatientStatus {
    Active,
    Admitted,
    Discharged,
}

impl PatientStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PatientStatus::Active => "Active",
            PatientStatus::Admitted => "Admitted",
            PatientStatus::Discharged => "Discharged",
        }
    }
}

/// A registered patient. Stored in the `patients` collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Patient {
    /// Stable identifier such as `P001`.
    pub id: RecordId,
    pub full_name: NonEmptyText,
    pub age: u8,
    pub status: PatientStatus,
    #[serde(default)]
    pub assigned_doctor: Option<String>,
    /// Handle of the patient's scanned records, if uploaded.
    #[serde(default)]
    pub records_file_ref: Option<FileHandle>,
}

impl_record!(Patient, PATIENTS_COLLECTION, Category::Patients, "P", 3);

impl Attachable for Patient {
    fn attachment(&self) -> Option<&FileHandle> {
        self.records_file_ref.as_ref()
    }

    fn set_attachment(&mut self, handle: FileHandle) {
        self.records_file_ref = Some(handle);
    }
}

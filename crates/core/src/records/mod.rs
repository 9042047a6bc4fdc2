//! Typed record shapes.
//!
//! Each record kind lives in its own named collection. Collections are
//! independent of one another: a clinical record refers to its patient by
//! id only, and nothing enforces that the patient exists.
//!
//! Patient-scoped collections are stored newest-first. New records are
//! prepended, so the first record for a patient is always the latest.

/// Implements [`Record`] for a struct with an `id: RecordId` field.
macro_rules! impl_record {
    ($ty:ty, $collection:expr, $category:expr, $prefix:literal, $width:literal) => {
        impl $crate::records::Record for $ty {
            const COLLECTION: &'static str = $collection;
            const CATEGORY: $crate::roles::Category = $category;
            const ID_PREFIX: &'static str = $prefix;
            const ID_WIDTH: usize = $width;

            fn id(&self) -> &wardview_types::RecordId {
                &self.id
            }

            fn set_id(&mut self, id: wardview_types::RecordId) {
                self.id = id;
            }
        }
    };
}

/// Implements [`PatientScoped`] for a struct with a `patient_id: RecordId` field.
macro_rules! impl_patient_scoped {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::records::PatientScoped for $ty {
                fn patient_id(&self) -> &str {
                    self.patient_id.as_str()
                }
            }
        )+
    };
}

pub mod announcement;
pub mod clinical;
pub(crate) mod clock;
pub mod facility;
pub mod patient;
pub mod staff;

pub use announcement::{Announcement, Audience};
pub use clinical::{DispensingRecord, ImagingResult, LabResult, LabStatus, Medication, VitalSign};
pub use facility::{MedOrder, OrderStatus, QcOutcome, QcRecord, UnavailableMedication};
pub use patient::{Patient, PatientStatus};
pub use staff::StaffMember;

use crate::roles::Category;
use crate::{CoreError, CoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wardview_files::FileHandle;
use wardview_types::RecordId;

/// A record kind stored in its own collection.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Key the collection is stored under.
    const COLLECTION: &'static str;
    /// Permission category governing the collection.
    const CATEGORY: Category;
    /// Prefix of generated ids, e.g. `P` or `LAB-`.
    const ID_PREFIX: &'static str;
    /// Zero-padded width of the numeric part of generated ids.
    const ID_WIDTH: usize;

    fn id(&self) -> &RecordId;
    fn set_id(&mut self, id: RecordId);
}

/// A record that belongs to one patient.
pub trait PatientScoped {
    fn patient_id(&self) -> &str;
}

/// A record that can carry one binary attachment.
pub trait Attachable {
    fn attachment(&self) -> Option<&FileHandle>;
    fn set_attachment(&mut self, handle: FileHandle);
}

/// Next sequential id for a collection: one past the highest existing numeric suffix.
///
/// Ids that do not carry `R::ID_PREFIX` followed by digits are ignored.
///
/// # Errors
///
/// Returns `CoreError::InvalidInput` if the highest suffix is already the
/// largest representable one.
pub fn next_record_id<R: Record>(existing: &[R]) -> CoreResult<RecordId> {
    let highest = existing
        .iter()
        .filter_map(|r| r.id().as_str().strip_prefix(R::ID_PREFIX))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    let next = highest.checked_add(1).ok_or_else(|| {
        CoreError::InvalidInput(format!(
            "{} ids are exhausted after {}{}",
            R::COLLECTION,
            R::ID_PREFIX,
            highest
        ))
    })?;

    let raw = format!("{}{:0width$}", R::ID_PREFIX, next, width = R::ID_WIDTH);
    Ok(RecordId::parse(&raw).expect("generated ids use the record id alphabet"))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use wardview_types::NonEmptyText;

    pub fn id(raw: &str) -> RecordId {
        RecordId::parse(raw).unwrap()
    }

    pub fn text(raw: &str) -> NonEmptyText {
        NonEmptyText::new(raw).unwrap()
    }

    pub fn date(raw: &str) -> NaiveDate {
        raw.parse().unwrap()
    }

    pub fn time(raw: &str) -> NaiveTime {
        NaiveTime::parse_from_str(raw, "%H:%M").unwrap()
    }

    pub fn patient(raw_id: &str, name: &str) -> Patient {
        Patient {
            id: id(raw_id),
            full_name: text(name),
            age: 40,
            status: PatientStatus::Active,
            assigned_doctor: None,
            records_file_ref: None,
        }
    }

    pub fn medication(raw_id: &str, patient_id: &str, drug: &str) -> Medication {
        Medication {
            id: id(raw_id),
            patient_id: id(patient_id),
            drug: text(drug),
            dosage: text("500mg"),
            frequency: text("Twice daily"),
            prescribed_by: text("Dr. Okafor"),
            recorded_date: date("2024-03-01"),
            recorded_time: time("09:00"),
            author_role: crate::roles::Role::Physician,
        }
    }

    pub fn lab_result(raw_id: &str, patient_id: &str, test_name: &str) -> LabResult {
        LabResult {
            id: id(raw_id),
            patient_id: id(patient_id),
            test_name: text(test_name),
            result: text("Normal"),
            reference_range: None,
            status: LabStatus::Final,
            report_file_ref: None,
            recorded_date: date("2024-03-02"),
            recorded_time: time("11:15"),
            author_role: crate::roles::Role::LabTech,
        }
    }
}

//! Patient-scoped clinical records.
//!
//! Every kind here carries `patient_id` plus the shared recording metadata
//! (`recorded_date`, `recorded_time`, `author_role`).

use super::Attachable;
use crate::constants::{
    DISPENSING_COLLECTION, IMAGING_RESULTS_COLLECTION, LAB_RESULTS_COLLECTION,
    MEDICATIONS_COLLECTION, VITALS_COLLECTION,
};
use crate::roles::{Category, Role};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use wardview_files::FileHandle;
use wardview_types::{NonEmptyText, RecordId};

/// A prescribed medication. Stored in `medications`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Medication {
    pub id: RecordId,
    pub patient_id: RecordId,
    pub drug: NonEmptyText,
    pub dosage: NonEmptyText,
    pub frequency: NonEmptyText,
    pub prescribed_by: NonEmptyText,
    pub recorded_date: NaiveDate,
    #[serde(with = "super::clock")]
    pub recorded_time: NaiveTime,
    pub author_role: Role,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabStatus {
    Pending,
    Final,
    Critical,
}

impl LabStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LabStatus::Pending => "Pending",
            LabStatus::Final => "Final",
            LabStatus::Critical => "Critical",
        }
    }
}

/// A laboratory result. Stored in `labResults`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LabResult {
    pub id: RecordId,
    pub patient_id: RecordId,
    pub test_name: NonEmptyText,
    pub result: NonEmptyText,
    #[serde(default)]
    pub reference_range: Option<String>,
    pub status: LabStatus,
    /// Handle of the uploaded report (typically a PDF).
    #[serde(default)]
    pub report_file_ref: Option<FileHandle>,
    pub recorded_date: NaiveDate,
    #[serde(with = "super::clock")]
    pub recorded_time: NaiveTime,
    pub author_role: Role,
}

/// An imaging study result. Stored in `imagingResults`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ImagingResult {
    pub id: RecordId,
    pub patient_id: RecordId,
    /// X-Ray, CT, MRI, Ultrasound...
    pub modality: NonEmptyText,
    pub body_part: NonEmptyText,
    pub findings: NonEmptyText,
    #[serde(default)]
    pub image_file_ref: Option<FileHandle>,
    pub recorded_date: NaiveDate,
    #[serde(with = "super::clock")]
    pub recorded_time: NaiveTime,
    pub author_role: Role,
}

/// A set of vital sign observations. Stored in `vitals`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VitalSign {
    pub id: RecordId,
    pub patient_id: RecordId,
    /// Systolic/diastolic, e.g. `120/80`.
    pub blood_pressure: NonEmptyText,
    pub heart_rate: u16,
    pub temperature_c: f32,
    pub spo2: u8,
    pub recorded_date: NaiveDate,
    #[serde(with = "super::clock")]
    pub recorded_time: NaiveTime,
    pub author_role: Role,
}

/// Medication handed out by the pharmacy. Stored in `dispensing`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DispensingRecord {
    pub id: RecordId,
    pub patient_id: RecordId,
    pub medication: NonEmptyText,
    pub quantity: u32,
    pub dispensed_by: NonEmptyText,
    pub recorded_date: NaiveDate,
    #[serde(with = "super::clock")]
    pub recorded_time: NaiveTime,
    pub author_role: Role,
}

impl_record!(Medication, MEDICATIONS_COLLECTION, Category::Prescriptions, "MED-", 4);
impl_record!(LabResult, LAB_RESULTS_COLLECTION, Category::LabResults, "LAB-", 4);
impl_record!(ImagingResult, IMAGING_RESULTS_COLLECTION, Category::Imaging, "IMG-", 4);
impl_record!(VitalSign, VITALS_COLLECTION, Category::Vitals, "VIT-", 4);
impl_record!(DispensingRecord, DISPENSING_COLLECTION, Category::Dispensing, "DSP-", 4);

impl_patient_scoped!(Medication, LabResult, ImagingResult, VitalSign, DispensingRecord);

impl Attachable for LabResult {
    fn attachment(&self) -> Option<&FileHandle> {
        self.report_file_ref.as_ref()
    }

    fn set_attachment(&mut self, handle: FileHandle) {
        self.report_file_ref = Some(handle);
    }
}

impl Attachable for ImagingResult {
    fn attachment(&self) -> Option<&FileHandle> {
        self.image_file_ref.as_ref()
    }

    fn set_attachment(&mut self, handle: FileHandle) {
        self.image_file_ref = Some(handle);
    }
}

//! Table cells for each record kind.

use crate::records::{
    Announcement, Attachable, DispensingRecord, ImagingResult, LabResult, MedOrder, Medication,
    Patient, QcOutcome, QcRecord, StaffMember, UnavailableMedication, VitalSign,
};
use chrono::{NaiveDate, NaiveTime};

const EMPTY_CELL: &str = "-";

/// A record that can be shown as a table row and as a history line.
pub trait RowSource {
    const COLUMNS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;

    fn describe(&self) -> String;
}

fn stamp(date: NaiveDate, time: NaiveTime) -> String {
    format!("{} {}", date.format("%Y-%m-%d"), time.format("%H:%M"))
}

fn optional(value: Option<&str>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(EMPTY_CELL)
        .to_owned()
}

fn attached<R: Attachable>(record: &R) -> String {
    match record.attachment() {
        Some(handle) => handle.original_filename.to_string(),
        None => EMPTY_CELL.to_owned(),
    }
}

impl RowSource for Patient {
    const COLUMNS: &'static [&'static str] =
        &["ID", "Name", "Age", "Status", "Doctor", "Records"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.full_name.to_string(),
            self.age.to_string(),
            self.status.as_str().to_owned(),
            optional(self.assigned_doctor.as_deref()),
            attached(self),
        ]
    }

    fn describe(&self) -> String {
        format!("{} ({}), {}", self.full_name, self.id, self.status.as_str())
    }
}

impl RowSource for StaffMember {
    const COLUMNS: &'static [&'static str] =
        &["ID", "Name", "Role", "Department", "Contact", "Registered"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.full_name.to_string(),
            self.role.to_string(),
            self.department.to_string(),
            optional(self.contact.as_deref()),
            self.registered_date.to_string(),
        ]
    }

    fn describe(&self) -> String {
        format!("{} ({}), {}", self.full_name, self.role, self.department)
    }
}

impl RowSource for Medication {
    const COLUMNS: &'static [&'static str] =
        &["Drug", "Dosage", "Frequency", "Prescribed by", "Recorded"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.drug.to_string(),
            self.dosage.to_string(),
            self.frequency.to_string(),
            self.prescribed_by.to_string(),
            stamp(self.recorded_date, self.recorded_time),
        ]
    }

    fn describe(&self) -> String {
        format!(
            "{}: {} {} {}, by {}",
            stamp(self.recorded_date, self.recorded_time),
            self.drug,
            self.dosage,
            self.frequency,
            self.prescribed_by
        )
    }
}

impl RowSource for LabResult {
    const COLUMNS: &'static [&'static str] =
        &["Test", "Result", "Reference", "Status", "Recorded", "Report"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.test_name.to_string(),
            self.result.to_string(),
            optional(self.reference_range.as_deref()),
            self.status.as_str().to_owned(),
            stamp(self.recorded_date, self.recorded_time),
            attached(self),
        ]
    }

    fn describe(&self) -> String {
        format!(
            "{}: {} = {} ({})",
            stamp(self.recorded_date, self.recorded_time),
            self.test_name,
            self.result,
            self.status.as_str()
        )
    }
}

impl RowSource for ImagingResult {
    const COLUMNS: &'static [&'static str] =
        &["Modality", "Body part", "Findings", "Recorded", "Image"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.modality.to_string(),
            self.body_part.to_string(),
            self.findings.to_string(),
            stamp(self.recorded_date, self.recorded_time),
            attached(self),
        ]
    }

    fn describe(&self) -> String {
        format!(
            "{}: {} {}, {}",
            stamp(self.recorded_date, self.recorded_time),
            self.modality,
            self.body_part,
            self.findings
        )
    }
}

impl RowSource for VitalSign {
    const COLUMNS: &'static [&'static str] =
        &["Blood pressure", "Heart rate", "Temp (C)", "SpO2", "Recorded"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.blood_pressure.to_string(),
            format!("{} bpm", self.heart_rate),
            format!("{:.1}", self.temperature_c),
            format!("{}%", self.spo2),
            stamp(self.recorded_date, self.recorded_time),
        ]
    }

    fn describe(&self) -> String {
        format!(
            "{}: BP {}, HR {}, T {:.1}, SpO2 {}%",
            stamp(self.recorded_date, self.recorded_time),
            self.blood_pressure,
            self.heart_rate,
            self.temperature_c,
            self.spo2
        )
    }
}

impl RowSource for DispensingRecord {
    const COLUMNS: &'static [&'static str] =
        &["Medication", "Quantity", "Dispensed by", "Recorded"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.medication.to_string(),
            self.quantity.to_string(),
            self.dispensed_by.to_string(),
            stamp(self.recorded_date, self.recorded_time),
        ]
    }

    fn describe(&self) -> String {
        format!(
            "{}: {} x{} by {}",
            stamp(self.recorded_date, self.recorded_time),
            self.medication,
            self.quantity,
            self.dispensed_by
        )
    }
}

impl RowSource for QcRecord {
    const COLUMNS: &'static [&'static str] =
        &["ID", "Instrument", "Test", "Outcome", "Notes", "Recorded"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.instrument.to_string(),
            self.test_name.to_string(),
            match self.outcome {
                QcOutcome::Pass => "Pass".to_owned(),
                QcOutcome::Fail => "Fail".to_owned(),
            },
            optional(self.notes.as_deref()),
            stamp(self.recorded_date, self.recorded_time),
        ]
    }

    fn describe(&self) -> String {
        format!("{} {} on {}", self.id, self.test_name, self.instrument)
    }
}

impl RowSource for UnavailableMedication {
    const COLUMNS: &'static [&'static str] =
        &["ID", "Medication", "Reason", "Expected restock", "Recorded"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.medication.to_string(),
            self.reason.to_string(),
            self.expected_restock
                .map(|d| d.to_string())
                .unwrap_or_else(|| "Unknown".to_owned()),
            stamp(self.recorded_date, self.recorded_time),
        ]
    }

    fn describe(&self) -> String {
        format!("{}: {}", self.medication, self.reason)
    }
}

impl RowSource for MedOrder {
    const COLUMNS: &'static [&'static str] =
        &["ID", "Medication", "Quantity", "Supplier", "Status", "Recorded"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.medication.to_string(),
            self.quantity.to_string(),
            self.supplier.to_string(),
            self.status.as_str().to_owned(),
            stamp(self.recorded_date, self.recorded_time),
        ]
    }

    fn describe(&self) -> String {
        format!(
            "{} x{} from {} ({})",
            self.medication,
            self.quantity,
            self.supplier,
            self.status.as_str()
        )
    }
}

impl RowSource for Announcement {
    const COLUMNS: &'static [&'static str] = &["Date", "Title", "Description", "Audience"];

    fn cells(&self) -> Vec<String> {
        let audience = self
            .visible_to
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        vec![
            self.date.to_string(),
            self.title.to_string(),
            self.description.to_string(),
            audience,
        ]
    }

    fn describe(&self) -> String {
        format!("{}: {}", self.title, self.description)
    }
}

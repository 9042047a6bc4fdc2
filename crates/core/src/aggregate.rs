//! Per-patient aggregation.
//!
//! Joins a patient roster with one patient-scoped collection. Related
//! collections are newest-first, so the first match for a patient is the
//! latest record and the matches in order are the history.
//!
//! Records whose patient id matches nobody in the roster are orphans. They are
//! left out of every result and reported once per index as a warning.

use crate::data::DashboardData;
use crate::records::{
    DispensingRecord, ImagingResult, LabResult, Medication, Patient, PatientScoped, VitalSign,
};
use std::collections::{HashMap, HashSet};

/// Related records grouped by patient id, newest-first within each group.
#[derive(Debug)]
pub struct PatientIndex<'r, R> {
    by_patient: HashMap<&'r str, Vec<&'r R>>,
    orphans: usize,
}

impl<'r, R> PatientIndex<'r, R> {
    /// Builds the index in a single pass over `related`.
    pub fn build<F>(patients: &[Patient], related: &'r [R], key_fn: F) -> Self
    where
        F: Fn(&'r R) -> &'r str,
    {
        let known: HashSet<&str> = patients.iter().map(|p| p.id.as_str()).collect();
        let mut by_patient: HashMap<&'r str, Vec<&'r R>> = HashMap::new();
        let mut orphans = 0;

        for record in related {
            let key = key_fn(record);
            if known.contains(key) {
                by_patient.entry(key).or_default().push(record);
            } else {
                orphans += 1;
            }
        }

        if orphans > 0 {
            tracing::warn!(
                orphaned_records = orphans,
                "records reference patients missing from the roster"
            );
        }

        Self { by_patient, orphans }
    }

    pub fn latest(&self, patient_id: &str) -> Option<&'r R> {
        self.history(patient_id).first().copied()
    }

    pub fn history(&self, patient_id: &str) -> &[&'r R] {
        self.by_patient
            .get(patient_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn orphan_count(&self) -> usize {
        self.orphans
    }
}

/// Each patient paired with their latest related record, in roster order.
#[derive(Debug)]
pub struct LatestByPatient<'p, 'r, R> {
    entries: Vec<(&'p Patient, Option<&'r R>)>,
    /// Patient id to position in `entries`.
    positions: HashMap<&'p str, usize>,
    orphans: usize,
}

impl<'p, 'r, R> LatestByPatient<'p, 'r, R> {
    pub fn iter(&self) -> impl Iterator<Item = (&'p Patient, Option<&'r R>)> + '_ {
        self.entries.iter().copied()
    }

    /// Latest record of `patient_id`; `None` if the patient has none or is unknown.
    pub fn get(&self, patient_id: &str) -> Option<&'r R> {
        self.positions
            .get(patient_id)
            .and_then(|&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn orphan_count(&self) -> usize {
        self.orphans
    }
}

/// Latest related record per patient, matched on the record's patient id.
pub fn latest_for<'p, 'r, R: PatientScoped>(
    patients: &'p [Patient],
    related: &'r [R],
) -> LatestByPatient<'p, 'r, R> {
    latest_for_by(patients, related, |r| r.patient_id())
}

/// [`latest_for`] with a caller-chosen field naming the patient.
pub fn latest_for_by<'p, 'r, R, F>(
    patients: &'p [Patient],
    related: &'r [R],
    key_fn: F,
) -> LatestByPatient<'p, 'r, R>
where
    F: Fn(&'r R) -> &'r str,
{
    let index = PatientIndex::build(patients, related, key_fn);
    let entries: Vec<_> = patients
        .iter()
        .map(|p| (p, index.latest(p.id.as_str())))
        .collect();
    let mut positions = HashMap::with_capacity(entries.len());
    for (i, (p, _)) in entries.iter().enumerate() {
        positions.entry(p.id.as_str()).or_insert(i);
    }

    LatestByPatient {
        entries,
        positions,
        orphans: index.orphan_count(),
    }
}

/// All related records of one patient, newest-first.
///
/// Empty when `patient_id` is not in the roster.
pub fn history_for<'r, R: PatientScoped>(
    patients: &[Patient],
    patient_id: &str,
    related: &'r [R],
) -> Vec<&'r R> {
    if !patients.iter().any(|p| p.id.as_str() == patient_id) {
        return Vec::new();
    }
    related
        .iter()
        .filter(|r| r.patient_id() == patient_id)
        .collect()
}

/// One patient's histories across the clinical collections.
#[derive(Debug)]
pub struct PatientTimeline<'a> {
    pub patient: &'a Patient,
    pub medications: Vec<&'a Medication>,
    pub lab_results: Vec<&'a LabResult>,
    pub imaging_results: Vec<&'a ImagingResult>,
    pub vitals: Vec<&'a VitalSign>,
    pub dispensing: Vec<&'a DispensingRecord>,
}

impl<'a> PatientTimeline<'a> {
    /// `None` when the patient is not in the roster.
    pub fn build(data: &'a DashboardData, patient_id: &str) -> Option<Self> {
        let patient = data.patients.iter().find(|p| p.id.as_str() == patient_id)?;
        let roster = &data.patients;

        Some(Self {
            patient,
            medications: history_for(roster, patient_id, &data.medications),
            lab_results: history_for(roster, patient_id, &data.lab_results),
            imaging_results: history_for(roster, patient_id, &data.imaging_results),
            vitals: history_for(roster, patient_id, &data.vitals),
            dispensing: history_for(roster, patient_id, &data.dispensing),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.medications.is_empty()
            && self.lab_results.is_empty()
            && self.imaging_results.is_empty()
            && self.vitals.is_empty()
            && self.dispensing.is_empty()
    }
}

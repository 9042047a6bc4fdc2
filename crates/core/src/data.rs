//! A snapshot of every collection, loaded fresh for each page.

use crate::records::{
    Announcement, DispensingRecord, ImagingResult, LabResult, MedOrder, Medication, Patient,
    QcRecord, StaffMember, UnavailableMedication, VitalSign,
};
use crate::roles::Category;
use crate::store::{KeyValueStore, RecordStore};
use crate::CoreResult;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardData {
    pub patients: Vec<Patient>,
    pub staff: Vec<StaffMember>,
    pub medications: Vec<Medication>,
    pub lab_results: Vec<LabResult>,
    pub imaging_results: Vec<ImagingResult>,
    pub vitals: Vec<VitalSign>,
    pub dispensing: Vec<DispensingRecord>,
    pub qc_records: Vec<QcRecord>,
    pub unavailable_medications: Vec<UnavailableMedication>,
    pub med_orders: Vec<MedOrder>,
    pub announcements: Vec<Announcement>,
}

impl DashboardData {
    /// Read every collection from `store`. Unreadable collections come back empty.
    pub fn load<S: KeyValueStore>(store: &RecordStore<S>) -> CoreResult<Self> {
        Ok(Self {
            patients: store.load()?,
            staff: store.load()?,
            medications: store.load()?,
            lab_results: store.load()?,
            imaging_results: store.load()?,
            vitals: store.load()?,
            dispensing: store.load()?,
            qc_records: store.load()?,
            unavailable_medications: store.load()?,
            med_orders: store.load()?,
            announcements: store.load()?,
        })
    }

    /// Number of records held for `category`.
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Patients => self.patients.len(),
            Category::Staff => self.staff.len(),
            Category::Prescriptions => self.medications.len(),
            Category::LabResults => self.lab_results.len(),
            Category::Imaging => self.imaging_results.len(),
            Category::Vitals => self.vitals.len(),
            Category::Dispensing => self.dispensing.len(),
            Category::Inventory => self.unavailable_medications.len(),
            Category::QualityControl => self.qc_records.len(),
            Category::Orders => self.med_orders.len(),
            Category::Announcements => self.announcements.len(),
        }
    }
}

//! Record mutations on behalf of a session.
//!
//! Each mutation passes the same checks that decide the composer's
//! affordances, so a role is refused exactly the actions it is not offered.
//! The checks are advisory: the substrate itself accepts any write.
//!
//! Every mutation reads its collection with
//! [`RecordStore::load_for_update`], so a collection holding records that do
//! not decode is refused rather than rewritten without them.

use crate::access::mutation_allowed;
use crate::blob::BlobStore;
use crate::constants::{
    ANNOUNCEMENTS_COLLECTION, DISPENSING_COLLECTION, IMAGING_RESULTS_COLLECTION,
    LAB_RESULTS_COLLECTION, MEDICATIONS_COLLECTION, MED_ORDERS_COLLECTION, PATIENTS_COLLECTION,
    QC_RECORDS_COLLECTION, STAFF_COLLECTION, UNAVAILABLE_MEDICATIONS_COLLECTION, VITALS_COLLECTION,
};
use crate::records::{
    next_record_id, Announcement, Attachable, DispensingRecord, ImagingResult, LabResult, MedOrder,
    Medication, Patient, QcRecord, Record, StaffMember, UnavailableMedication, VitalSign,
};
use crate::roles::Action;
use crate::session::SessionUser;
use crate::store::{KeyValueStore, RecordStore};
use crate::{CoreError, CoreResult};
use serde_json::Value;
use wardview_files::FileHandle;

/// Dispatches a generic `RecordActions` method on a collection name.
macro_rules! by_collection {
    ($this:ident, $collection:expr, $method:ident($($arg:expr),*)) => {
        match $collection {
            PATIENTS_COLLECTION => $this.$method::<Patient>($($arg),*),
            STAFF_COLLECTION => $this.$method::<StaffMember>($($arg),*),
            MEDICATIONS_COLLECTION => $this.$method::<Medication>($($arg),*),
            LAB_RESULTS_COLLECTION => $this.$method::<LabResult>($($arg),*),
            IMAGING_RESULTS_COLLECTION => $this.$method::<ImagingResult>($($arg),*),
            VITALS_COLLECTION => $this.$method::<VitalSign>($($arg),*),
            DISPENSING_COLLECTION => $this.$method::<DispensingRecord>($($arg),*),
            QC_RECORDS_COLLECTION => $this.$method::<QcRecord>($($arg),*),
            UNAVAILABLE_MEDICATIONS_COLLECTION => {
                $this.$method::<UnavailableMedication>($($arg),*)
            }
            MED_ORDERS_COLLECTION => $this.$method::<MedOrder>($($arg),*),
            ANNOUNCEMENTS_COLLECTION => $this.$method::<Announcement>($($arg),*),
            other => Err(CoreError::InvalidInput(format!("unknown collection '{other}'"))),
        }
    };
}

pub struct RecordActions<'a, S> {
    store: &'a mut RecordStore<S>,
    user: &'a SessionUser,
}

impl<'a, S: KeyValueStore> RecordActions<'a, S> {
    pub fn new(store: &'a mut RecordStore<S>, user: &'a SessionUser) -> Self {
        Self { store, user }
    }

    /// Assign the next sequential id to `record` and prepend it.
    ///
    /// Returns the record as stored.
    pub fn insert<R: Record>(&mut self, mut record: R) -> CoreResult<R> {
        self.authorize::<R>(Action::Insert)?;

        let mut records: Vec<R> = self.store.load_for_update()?;
        record.set_id(next_record_id(&records)?);
        records.insert(0, record.clone());
        self.store.save(&records)?;

        tracing::info!(
            "{} inserted {} {}",
            self.user.role_label(),
            R::COLLECTION,
            record.id()
        );
        Ok(record)
    }

    /// Replace the stored record with the same id, keeping its position.
    pub fn update<R: Record>(&mut self, record: R) -> CoreResult<()> {
        self.authorize::<R>(Action::Update)?;

        let mut records: Vec<R> = self.store.load_for_update()?;
        let slot = records
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or_else(|| not_found::<R>(record.id().as_str()))?;
        *slot = record;
        self.store.save(&records)
    }

    /// Remove the record with `id`. Returns the removed record.
    pub fn delete<R: Record>(&mut self, id: &str) -> CoreResult<R> {
        self.authorize::<R>(Action::Delete)?;

        let mut records: Vec<R> = self.store.load_for_update()?;
        let position = records
            .iter()
            .position(|r| r.id().as_str() == id)
            .ok_or_else(|| not_found::<R>(id))?;
        let removed = records.remove(position);
        self.store.save(&records)?;

        tracing::info!("{} deleted {} {}", self.user.role_label(), R::COLLECTION, id);
        Ok(removed)
    }

    /// Store `bytes` as the attachment of record `id` and record the handle on it.
    ///
    /// Attaching counts as an update of the record. The blob store's handle
    /// is committed only once the record has been saved with it, so a failed
    /// save leaves the previous attachment current.
    pub fn attach_file<R, B>(
        &mut self,
        blobs: &B,
        id: &str,
        original_filename: &str,
        bytes: &[u8],
    ) -> CoreResult<FileHandle>
    where
        R: Record + Attachable,
        B: BlobStore + ?Sized,
    {
        self.authorize::<R>(Action::Update)?;

        let mut records: Vec<R> = self.store.load_for_update()?;
        let record = records
            .iter_mut()
            .find(|r| r.id().as_str() == id)
            .ok_or_else(|| not_found::<R>(id))?;

        let handle = blobs.stage(R::COLLECTION, record.id(), original_filename, bytes)?;
        record.set_attachment(handle.clone());
        let record_id = record.id().clone();
        self.store.save(&records)?;
        blobs.commit(R::COLLECTION, &record_id, &handle)?;

        tracing::info!(
            "attached {} ({} bytes) to {} {}",
            handle.original_filename,
            handle.size_bytes,
            R::COLLECTION,
            id
        );
        Ok(handle)
    }

    /// [`insert`](Self::insert) from a JSON object addressed by collection name.
    ///
    /// The object carries the record's camelCase fields. Any `id` in it is
    /// ignored and replaced by the next sequential id. Returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` for an unknown collection or a body
    /// that does not match the record shape.
    pub fn insert_in(&mut self, collection: &str, body: Value) -> CoreResult<Value> {
        by_collection!(self, collection, insert_value(body))
    }

    /// [`update`](Self::update) from a JSON object addressed by collection name.
    ///
    /// `id` names the record; an `id` field in the body is overridden.
    pub fn update_in(&mut self, collection: &str, id: &str, body: Value) -> CoreResult<Value> {
        by_collection!(self, collection, update_value(id, body))
    }

    /// [`delete`](Self::delete) addressed by collection name.
    pub fn delete_in(&mut self, collection: &str, id: &str) -> CoreResult<()> {
        by_collection!(self, collection, delete_record(id))
    }

    /// [`attach_file`](Self::attach_file) addressed by collection name.
    ///
    /// Only patients, lab results and imaging results carry attachments.
    pub fn attach_in<B: BlobStore + ?Sized>(
        &mut self,
        blobs: &B,
        collection: &str,
        id: &str,
        original_filename: &str,
        bytes: &[u8],
    ) -> CoreResult<FileHandle> {
        match collection {
            PATIENTS_COLLECTION => self.attach_file::<Patient, B>(blobs, id, original_filename, bytes),
            LAB_RESULTS_COLLECTION => {
                self.attach_file::<LabResult, B>(blobs, id, original_filename, bytes)
            }
            IMAGING_RESULTS_COLLECTION => {
                self.attach_file::<ImagingResult, B>(blobs, id, original_filename, bytes)
            }
            other => Err(CoreError::InvalidInput(format!(
                "collection '{other}' does not take attachments"
            ))),
        }
    }

    fn insert_value<R: Record>(&mut self, mut body: Value) -> CoreResult<Value> {
        self.authorize::<R>(Action::Insert)?;
        if let Some(fields) = body.as_object_mut() {
            fields.insert("id".into(), Value::String(format!("{}0", R::ID_PREFIX)));
        }
        let stored = self.insert(decode::<R>(body)?)?;
        encode(&stored)
    }

    fn update_value<R: Record>(&mut self, id: &str, mut body: Value) -> CoreResult<Value> {
        self.authorize::<R>(Action::Update)?;
        if let Some(fields) = body.as_object_mut() {
            fields.insert("id".into(), Value::String(id.to_owned()));
        }
        let record = decode::<R>(body)?;
        self.update(record.clone())?;
        encode(&record)
    }

    fn delete_record<R: Record>(&mut self, id: &str) -> CoreResult<()> {
        self.delete::<R>(id).map(drop)
    }

    fn authorize<R: Record>(&self, action: Action) -> CoreResult<()> {
        if mutation_allowed(self.user.profile(), action, R::CATEGORY) {
            return Ok(());
        }
        tracing::warn!(
            "{} refused: {} on {}",
            self.user.role_label(),
            action,
            R::CATEGORY
        );
        Err(CoreError::NotPermitted {
            role: self.user.role_label().to_owned(),
            action,
            category: R::CATEGORY,
        })
    }
}

fn decode<R: Record>(body: Value) -> CoreResult<R> {
    serde_json::from_value(body)
        .map_err(|e| CoreError::InvalidInput(format!("invalid {} record: {e}", R::COLLECTION)))
}

fn encode<R: Record>(record: &R) -> CoreResult<Value> {
    serde_json::to_value(record).map_err(|source| CoreError::Serialization {
        collection: R::COLLECTION.to_owned(),
        source,
    })
}

fn not_found<R: Record>(id: &str) -> CoreError {
    CoreError::RecordNotFound {
        collection: R::COLLECTION.to_owned(),
        id: id.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::test_support::*;
    use crate::records::Audience;
    use crate::roles::{Category, Role};
    use crate::store::{MemoryStore, StoreError};
    use tempfile::TempDir;
    use wardview_files::FilesService;

    fn store_with_patients() -> RecordStore<MemoryStore> {
        let mut store = RecordStore::new(MemoryStore::default());
        store
            .save(&[patient("P001", "Amina"), patient("P002", "Kwame")])
            .unwrap();
        store
    }

    fn staff_member() -> StaffMember {
        StaffMember {
            id: id("S000"),
            full_name: text("Ruth Achieng"),
            role: Role::Nurse,
            department: text("Ward B"),
            contact: None,
            registered_date: date("2024-03-01"),
        }
    }

    #[test]
    fn insert_prepends_with_next_id() {
        let mut store = store_with_patients();
        store
            .save(&[medication("MED-0001", "P001", "Amoxicillin")])
            .unwrap();
        let user = SessionUser::new("Dr", "Physician", None);

        let stored = RecordActions::new(&mut store, &user)
            .insert(medication("MED-0000", "P002", "Metformin"))
            .unwrap();

        assert_eq!(stored.id.as_str(), "MED-0002");
        let meds: Vec<Medication> = store.load().unwrap();
        assert_eq!(meds[0].id.as_str(), "MED-0002");
        assert_eq!(meds.len(), 2);
    }

    #[test]
    fn refusal_names_role_action_and_category() {
        let mut store = store_with_patients();
        let user = SessionUser::new("Nurse", "Nurse", None);

        let err = RecordActions::new(&mut store, &user)
            .insert(medication("MED-0000", "P001", "Morphine"))
            .unwrap_err();

        match err {
            CoreError::NotPermitted {
                role,
                action,
                category,
            } => {
                assert_eq!(role, "Nurse");
                assert_eq!(action, Action::Insert);
                assert_eq!(category, Category::Prescriptions);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.load::<Medication>().unwrap().is_empty());
    }

    #[test]
    fn only_admin_registers_staff() {
        let mut store = store_with_patients();

        let admin = SessionUser::new("Grace", "Admin", None);
        let stored = RecordActions::new(&mut store, &admin)
            .insert(staff_member())
            .unwrap();
        assert_eq!(stored.id.as_str(), "S001");

        let physician = SessionUser::new("Dr", "Physician", None);
        assert!(matches!(
            RecordActions::new(&mut store, &physician).insert(staff_member()),
            Err(CoreError::NotPermitted { .. })
        ));
    }

    #[test]
    fn announcements_are_admin_only() {
        let mut store = store_with_patients();
        let ann = Announcement {
            id: id("ANN-0000"),
            title: text("Fire drill"),
            description: text("Friday"),
            date: date("2024-03-08"),
            visible_to: vec![Audience::All],
        };

        let pharmacist = SessionUser::new("Pedro", "Pharmacist", None);
        assert!(RecordActions::new(&mut store, &pharmacist)
            .insert(ann.clone())
            .is_err());

        let admin = SessionUser::new("Grace", "Admin", None);
        let stored = RecordActions::new(&mut store, &admin).insert(ann).unwrap();
        assert!(RecordActions::new(&mut store, &pharmacist)
            .delete::<Announcement>(stored.id.as_str())
            .is_err());
        RecordActions::new(&mut store, &admin)
            .delete::<Announcement>(stored.id.as_str())
            .unwrap();
        assert!(store.load::<Announcement>().unwrap().is_empty());
    }

    #[test]
    fn update_replaces_in_place() {
        let mut store = store_with_patients();
        let admin = SessionUser::new("Grace", "Admin", None);

        let mut kwame = patient("P002", "Kwame Boateng");
        kwame.age = 59;
        RecordActions::new(&mut store, &admin).update(kwame).unwrap();

        let patients: Vec<Patient> = store.load().unwrap();
        assert_eq!(patients[1].age, 59);
        assert_eq!(patients[1].full_name.as_str(), "Kwame Boateng");
    }

    #[test]
    fn update_of_missing_record_fails() {
        let mut store = store_with_patients();
        let admin = SessionUser::new("Grace", "Admin", None);

        let err = RecordActions::new(&mut store, &admin)
            .update(patient("P404", "Ghost"))
            .unwrap_err();
        assert!(matches!(err, CoreError::RecordNotFound { .. }));
    }

    #[test]
    fn delete_requires_delete_right() {
        let mut store = store_with_patients();
        let physician = SessionUser::new("Dr", "Physician", None);

        assert!(RecordActions::new(&mut store, &physician)
            .delete::<Patient>("P001")
            .is_err());
        assert_eq!(store.load::<Patient>().unwrap().len(), 2);
    }

    #[test]
    fn attach_file_stores_handle_on_record() {
        let temp = TempDir::new().unwrap();
        let files = FilesService::new(temp.path()).unwrap();
        let mut store = store_with_patients();
        store
            .save(&[lab_result("LAB-0001", "P001", "CRP")])
            .unwrap();
        let tech = SessionUser::new("Ingrid", "LabTech", None);

        let handle = RecordActions::new(&mut store, &tech)
            .attach_file::<LabResult, _>(&files, "LAB-0001", "crp.pdf", b"%PDF-1.4 report")
            .unwrap();

        let labs: Vec<LabResult> = store.load().unwrap();
        assert_eq!(labs[0].report_file_ref.as_ref(), Some(&handle));
        let bytes = BlobStore::get(&files, "labResults", &labs[0].id).unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"%PDF-1.4 report"[..]));
    }

    #[test]
    fn patient_cannot_attach() {
        let temp = TempDir::new().unwrap();
        let files = FilesService::new(temp.path()).unwrap();
        let mut store = store_with_patients();
        let user = SessionUser::new("Amina", "Patient", Some("P001".into()));

        let err = RecordActions::new(&mut store, &user)
            .attach_file::<Patient, _>(&files, "P001", "scan.png", b"data")
            .unwrap_err();
        assert!(matches!(err, CoreError::NotPermitted { .. }));
    }

    #[test]
    fn delete_in_dispatches_by_collection_name() {
        let mut store = store_with_patients();
        let admin = SessionUser::new("Grace", "Admin", None);

        RecordActions::new(&mut store, &admin)
            .delete_in("patients", "P002")
            .unwrap();
        assert_eq!(store.load::<Patient>().unwrap().len(), 1);

        let err = RecordActions::new(&mut store, &admin)
            .delete_in("billing", "B001")
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    /// Substrate that serves reads but refuses every write.
    struct FrozenStore(MemoryStore);

    impl KeyValueStore for FrozenStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("read-only volume".into()))
        }
    }

    #[test]
    fn insert_refuses_to_rewrite_a_partly_malformed_collection() {
        let raw = r#"[{"id":"P001","fullName":"Amina","age":40,"status":"Active"},{"id":"P002","fullName":"Kwame","age":51,"status":"Active","email":"k@example.org"}]"#;
        let mut substrate = MemoryStore::default();
        substrate.set(PATIENTS_COLLECTION, raw).unwrap();
        let mut store = RecordStore::new(substrate);
        let admin = SessionUser::new("Grace", "Admin", None);

        let err = RecordActions::new(&mut store, &admin)
            .insert(patient("P000", "New"))
            .unwrap_err();

        assert!(matches!(err, CoreError::MalformedCollection { .. }));
        assert_eq!(
            store.substrate().get(PATIENTS_COLLECTION).unwrap().as_deref(),
            Some(raw)
        );
    }

    #[test]
    fn delete_refuses_to_rewrite_a_malformed_collection() {
        let mut substrate = MemoryStore::default();
        substrate
            .set(PATIENTS_COLLECTION, r#"[{"id":"P001","fullName":"","age":40,"status":"Active"}]"#)
            .unwrap();
        let mut store = RecordStore::new(substrate);
        let admin = SessionUser::new("Grace", "Admin", None);

        assert!(matches!(
            RecordActions::new(&mut store, &admin).delete_in("patients", "P001"),
            Err(CoreError::MalformedCollection { .. })
        ));
    }

    #[test]
    fn failed_save_leaves_no_current_attachment() {
        let temp = TempDir::new().unwrap();
        let files = FilesService::new(temp.path()).unwrap();
        let mut seeded = RecordStore::new(MemoryStore::default());
        seeded
            .save(&[lab_result("LAB-0001", "P001", "CRP")])
            .unwrap();
        let mut store = RecordStore::new(FrozenStore(seeded.into_inner()));
        let tech = SessionUser::new("Ingrid", "LabTech", None);

        let err = RecordActions::new(&mut store, &tech)
            .attach_file::<LabResult, _>(&files, "LAB-0001", "crp.pdf", b"%PDF-1.4 report")
            .unwrap_err();

        assert!(matches!(err, CoreError::Storage(_)));
        assert_eq!(BlobStore::get(&files, "labResults", &id("LAB-0001")).unwrap(), None);
        let labs: Vec<LabResult> = store.load().unwrap();
        assert!(labs[0].report_file_ref.is_none());
    }

    #[test]
    fn insert_in_decodes_json_and_assigns_the_id() {
        let mut store = store_with_patients();
        let nurse = SessionUser::new("Ruth", "Nurse", None);
        let body = serde_json::json!({
            "id": "VIT-9999",
            "patientId": "P002",
            "bloodPressure": "118/76",
            "heartRate": 72,
            "temperatureC": 36.8,
            "spo2": 98,
            "recordedDate": "2024-03-05",
            "recordedTime": "08:30",
            "authorRole": "Nurse"
        });

        let stored = RecordActions::new(&mut store, &nurse)
            .insert_in("vitals", body)
            .unwrap();

        assert_eq!(stored["id"], "VIT-0001");
        let vitals: Vec<VitalSign> = store.load().unwrap();
        assert_eq!(vitals.len(), 1);
        assert_eq!(vitals[0].heart_rate, 72);
    }

    #[test]
    fn insert_in_rejects_a_body_of_the_wrong_shape() {
        let mut store = store_with_patients();
        let admin = SessionUser::new("Grace", "Admin", None);

        let err = RecordActions::new(&mut store, &admin)
            .insert_in("patients", serde_json::json!({"fullName": "No Age"}))
            .unwrap_err();

        assert!(matches!(err, CoreError::InvalidInput(_)));
        assert_eq!(store.load::<Patient>().unwrap().len(), 2);
    }

    #[test]
    fn insert_in_checks_permission_before_the_body() {
        let mut store = store_with_patients();
        let patient_user = SessionUser::new("Amina", "Patient", Some("P001".into()));

        let err = RecordActions::new(&mut store, &patient_user)
            .insert_in("patients", serde_json::json!({}))
            .unwrap_err();

        assert!(matches!(err, CoreError::NotPermitted { .. }));
    }

    #[test]
    fn update_in_takes_the_id_from_the_path() {
        let mut store = store_with_patients();
        let admin = SessionUser::new("Grace", "Admin", None);
        let body = serde_json::json!({
            "id": "P999",
            "fullName": "Kwame Boateng",
            "age": 59,
            "status": "Admitted"
        });

        let stored = RecordActions::new(&mut store, &admin)
            .update_in("patients", "P002", body)
            .unwrap();

        assert_eq!(stored["id"], "P002");
        let patients: Vec<Patient> = store.load().unwrap();
        assert_eq!(patients[1].age, 59);
        assert_eq!(patients.len(), 2);
    }

    #[test]
    fn attach_in_rejects_collections_without_attachments() {
        let temp = TempDir::new().unwrap();
        let files = FilesService::new(temp.path()).unwrap();
        let mut store = store_with_patients();
        let admin = SessionUser::new("Grace", "Admin", None);

        let err = RecordActions::new(&mut store, &admin)
            .attach_in(&files, "staff", "S001", "cv.pdf", b"cv")
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }
}

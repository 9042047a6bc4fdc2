//! Record store accessor.
//!
//! Collections are whole JSON arrays stored under one key each in a
//! [`KeyValueStore`] substrate. Reads are forgiving: a missing key or content
//! that does not match the record shape yields an empty collection and a
//! warning, never an error. Only failures of the substrate itself propagate.
//!
//! Mutations read through [`RecordStore::load_for_update`] instead, which
//! refuses malformed content so that a rewrite never replaces records that
//! could not be decoded.
//!
//! There is no cache. A save followed by a load of the same collection always
//! observes the write.

mod file;
mod memory;
mod seed;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use seed::SeedData;

use crate::constants::INITIALISED_KEY;
use crate::records::Record;
use crate::{CoreError, CoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;

/// Failure of the key-value substrate.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read '{key}': {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{key}' is not valid UTF-8: {source}")]
    Encoding {
        key: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// String-keyed persistence the record store sits on.
pub trait KeyValueStore {
    /// Returns `Ok(None)` when nothing is stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Typed access to the named collections held by a substrate.
#[derive(Debug)]
pub struct RecordStore<S> {
    substrate: S,
}

impl<S: KeyValueStore> RecordStore<S> {
    pub fn new(substrate: S) -> Self {
        Self { substrate }
    }

    pub fn substrate(&self) -> &S {
        &self.substrate
    }

    pub fn into_inner(self) -> S {
        self.substrate
    }

    /// Load the collection stored under `name`.
    ///
    /// Missing or malformed content yields an empty collection.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the substrate read itself fails.
    pub fn load_collection<R: DeserializeOwned>(&self, name: &str) -> CoreResult<Vec<R>> {
        match self.read(name)? {
            Stored::Records(records) => Ok(records),
            Stored::Missing => {
                tracing::warn!("collection '{}' is not stored, using empty collection", name);
                Ok(Vec::new())
            }
            Stored::Malformed(detail) => {
                tracing::warn!(
                    "collection '{}' is malformed ({}), using empty collection",
                    name,
                    detail
                );
                Ok(Vec::new())
            }
        }
    }

    pub fn load<R: Record>(&self) -> CoreResult<Vec<R>> {
        self.load_collection(R::COLLECTION)
    }

    /// Load `name` for a read-modify-write cycle.
    ///
    /// A missing collection is empty, but malformed content is an error.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MalformedCollection` if the stored content cannot be
    /// decoded, and `CoreError::Storage` if the substrate read fails.
    pub fn load_collection_for_update<R: DeserializeOwned>(&self, name: &str) -> CoreResult<Vec<R>> {
        match self.read(name)? {
            Stored::Records(records) => Ok(records),
            Stored::Missing => Ok(Vec::new()),
            Stored::Malformed(detail) => Err(CoreError::MalformedCollection {
                collection: name.to_owned(),
                detail,
            }),
        }
    }

    pub fn load_for_update<R: Record>(&self) -> CoreResult<Vec<R>> {
        self.load_collection_for_update(R::COLLECTION)
    }

    /// Replace the whole collection stored under `name` and mark it initialised.
    pub fn save_collection<R: Serialize>(&mut self, name: &str, records: &[R]) -> CoreResult<()> {
        let json = serde_json::to_string(records).map_err(|source| CoreError::Serialization {
            collection: name.to_owned(),
            source,
        })?;
        self.substrate.set(name, &json)?;
        self.mark_initialised(name)
    }

    pub fn save<R: Record>(&mut self, records: &[R]) -> CoreResult<()> {
        self.save_collection(R::COLLECTION, records)
    }

    /// Whether `name` has ever been written, including written empty.
    pub fn is_initialised(&self, name: &str) -> CoreResult<bool> {
        Ok(self.initialised()?.contains(name))
    }

    /// Load `name`, seeding it with `defaults` if it was never initialised.
    ///
    /// A collection that was saved empty stays empty. A collection that holds
    /// records but predates the initialised flag is adopted as-is.
    pub fn load_collection_with_fallback<R>(&mut self, name: &str, defaults: &[R]) -> CoreResult<Vec<R>>
    where
        R: Serialize + DeserializeOwned + Clone,
    {
        self.fallback(name, defaults).map(|(records, _)| records)
    }

    pub fn load_with_fallback<R: Record>(&mut self, defaults: &[R]) -> CoreResult<Vec<R>> {
        self.load_collection_with_fallback(R::COLLECTION, defaults)
    }

    /// Apply `seed` to every collection through the fallback rule.
    ///
    /// Returns the names of the collections that were actually seeded.
    pub fn seed_all(&mut self, seed: &SeedData) -> CoreResult<Vec<&'static str>> {
        let data = seed.collections();
        let mut seeded = Vec::new();

        macro_rules! apply {
            ($($field:ident),+ $(,)?) => {
                $(
                    if self.seed_one(&data.$field)? {
                        seeded.push(collection_name(&data.$field));
                    }
                )+
            };
        }

        apply!(
            patients,
            staff,
            medications,
            lab_results,
            imaging_results,
            vitals,
            dispensing,
            qc_records,
            unavailable_medications,
            med_orders,
            announcements,
        );

        tracing::info!("seeded {} collection(s)", seeded.len());
        Ok(seeded)
    }

    fn seed_one<R: Record>(&mut self, defaults: &[R]) -> CoreResult<bool> {
        self.fallback(R::COLLECTION, defaults).map(|(_, seeded)| seeded)
    }

    fn fallback<R>(&mut self, name: &str, defaults: &[R]) -> CoreResult<(Vec<R>, bool)>
    where
        R: Serialize + DeserializeOwned + Clone,
    {
        if self.is_initialised(name)? {
            return Ok((self.load_collection(name)?, false));
        }

        match self.read::<R>(name)? {
            Stored::Records(existing) if !existing.is_empty() => {
                self.mark_initialised(name)?;
                return Ok((existing, false));
            }
            Stored::Malformed(detail) => {
                tracing::warn!(
                    "collection '{}' is malformed ({}), not seeding over it",
                    name,
                    detail
                );
                return Ok((Vec::new(), false));
            }
            Stored::Records(_) | Stored::Missing => {}
        }

        tracing::info!("seeding collection '{}' with {} record(s)", name, defaults.len());
        self.save_collection(name, defaults)?;
        Ok((defaults.to_vec(), true))
    }

    fn read<R: DeserializeOwned>(&self, name: &str) -> CoreResult<Stored<R>> {
        let raw = match self.substrate.get(name) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Stored::Missing),
            Err(e @ StoreError::Encoding { .. }) => return Ok(Stored::Malformed(e.to_string())),
            Err(e) => return Err(e.into()),
        };

        let mut deserializer = serde_json::Deserializer::from_str(&raw);
        Ok(match serde_path_to_error::deserialize(&mut deserializer) {
            Ok(records) => Stored::Records(records),
            Err(e) => Stored::Malformed(format!("at {}: {}", e.path(), e.inner())),
        })
    }

    fn initialised(&self) -> CoreResult<BTreeSet<String>> {
        let Some(raw) = self.substrate.get(INITIALISED_KEY)? else {
            return Ok(BTreeSet::new());
        };

        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("initialised flag set is unreadable: {}, treating as empty", e);
            BTreeSet::new()
        }))
    }

    fn mark_initialised(&mut self, name: &str) -> CoreResult<()> {
        let mut names = self.initialised()?;
        if !names.insert(name.to_owned()) {
            return Ok(());
        }

        let json = serde_json::to_string(&names).map_err(|source| CoreError::Serialization {
            collection: INITIALISED_KEY.to_owned(),
            source,
        })?;
        self.substrate.set(INITIALISED_KEY, &json)?;
        Ok(())
    }
}

enum Stored<R> {
    Missing,
    Records(Vec<R>),
    /// Content that is not UTF-8 or does not match the record shape.
    Malformed(String),
}

fn collection_name<R: Record>(_: &[R]) -> &'static str {
    R::COLLECTION
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PATIENTS_COLLECTION;
    use crate::records::test_support::*;
    use crate::records::{Medication, Patient};

    fn store() -> RecordStore<MemoryStore> {
        RecordStore::new(MemoryStore::default())
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("disk unplugged".into()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk unplugged".into()))
        }
    }

    #[test]
    fn save_then_load_observes_the_write() {
        let mut s = store();
        let patients = vec![patient("P001", "Amina Yusuf"), patient("P002", "Kwame Boateng")];

        s.save(&patients).unwrap();

        assert_eq!(s.load::<Patient>().unwrap(), patients);
    }

    #[test]
    fn missing_collection_loads_empty() {
        assert!(store().load::<Medication>().unwrap().is_empty());
    }

    #[test]
    fn unparseable_collection_loads_empty() {
        let mut substrate = MemoryStore::default();
        substrate.set(PATIENTS_COLLECTION, "{not json").unwrap();
        let s = RecordStore::new(substrate);

        assert!(s.load::<Patient>().unwrap().is_empty());
    }

    #[test]
    fn wrong_shape_loads_empty() {
        let mut substrate = MemoryStore::default();
        substrate
            .set(PATIENTS_COLLECTION, r#"[{"id":"P001","fullName":"A","age":"old","status":"Active"}]"#)
            .unwrap();
        let s = RecordStore::new(substrate);

        assert!(s.load::<Patient>().unwrap().is_empty());
    }

    #[test]
    fn non_utf8_collection_loads_empty() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("patients.json"), [0xFF, 0xFE, b'[', b']']).unwrap();
        let s = RecordStore::new(FileStore::new(temp.path()));

        assert!(s.load::<Patient>().unwrap().is_empty());
        assert!(matches!(
            s.load_for_update::<Patient>(),
            Err(CoreError::MalformedCollection { .. })
        ));
    }

    #[test]
    fn load_for_update_refuses_a_partly_malformed_collection() {
        let mut substrate = MemoryStore::default();
        substrate
            .set(
                PATIENTS_COLLECTION,
                r#"[{"id":"P001","fullName":"Amina","age":40,"status":"Active"},
                    {"id":"P002","fullName":"Kwame","age":51,"status":"Active","email":"k@example.org"}]"#,
            )
            .unwrap();
        let s = RecordStore::new(substrate);

        assert!(s.load::<Patient>().unwrap().is_empty());
        match s.load_for_update::<Patient>().unwrap_err() {
            CoreError::MalformedCollection { collection, detail } => {
                assert_eq!(collection, PATIENTS_COLLECTION);
                assert!(detail.contains("[1]"), "{detail}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_collection_is_empty_for_update() {
        assert!(store().load_for_update::<Medication>().unwrap().is_empty());
    }

    #[test]
    fn fallback_does_not_seed_over_malformed_content() {
        let mut substrate = MemoryStore::default();
        substrate.set(PATIENTS_COLLECTION, "{not json").unwrap();
        let mut s = RecordStore::new(substrate);

        let loaded = s.load_with_fallback(&[patient("P001", "Seeded")]).unwrap();

        assert!(loaded.is_empty());
        assert!(!s.is_initialised(PATIENTS_COLLECTION).unwrap());
        assert_eq!(
            s.substrate().get(PATIENTS_COLLECTION).unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn substrate_failure_propagates() {
        let s = RecordStore::new(BrokenStore);
        let err = s.load::<Patient>().unwrap_err();
        assert!(matches!(err, CoreError::Storage(StoreError::Unavailable(_))));
    }

    #[test]
    fn fallback_seeds_a_fresh_collection_once() {
        let mut s = store();
        let defaults = vec![patient("P001", "Seeded")];

        let first = s.load_with_fallback(&defaults).unwrap();
        assert_eq!(first, defaults);
        assert!(s.is_initialised(PATIENTS_COLLECTION).unwrap());
        assert_eq!(s.load::<Patient>().unwrap(), defaults);
    }

    #[test]
    fn fallback_respects_a_deliberately_emptied_collection() {
        let mut s = store();
        let defaults = vec![patient("P001", "Seeded")];
        s.load_with_fallback(&defaults).unwrap();

        s.save::<Patient>(&[]).unwrap();

        assert!(s.load_with_fallback(&defaults).unwrap().is_empty());
    }

    #[test]
    fn fallback_adopts_existing_unflagged_records() {
        let mut substrate = MemoryStore::default();
        let existing = vec![patient("P007", "Existing")];
        substrate
            .set(PATIENTS_COLLECTION, &serde_json::to_string(&existing).unwrap())
            .unwrap();
        let mut s = RecordStore::new(substrate);

        let loaded = s.load_with_fallback(&[patient("P001", "Seeded")]).unwrap();

        assert_eq!(loaded, existing);
        assert!(s.is_initialised(PATIENTS_COLLECTION).unwrap());
    }

    #[test]
    fn seed_all_reports_only_fresh_collections() {
        let mut s = store();
        s.save::<Patient>(&[]).unwrap();

        let seeded = s.seed_all(&SeedData::demo()).unwrap();

        assert!(!seeded.contains(&PATIENTS_COLLECTION));
        assert!(seeded.contains(&"medications"));
        assert!(s.load::<Patient>().unwrap().is_empty());

        assert!(s.seed_all(&SeedData::demo()).unwrap().is_empty());
    }
}

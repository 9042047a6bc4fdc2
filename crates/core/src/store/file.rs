//! File-backed substrate: one `<key>.json` file per key.

use super::{KeyValueStore, StoreError};
use crate::constants::COLLECTION_FILE_EXTENSION;
use crate::validation::validate_storage_key;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_storage_key(key)?;
        Ok(self.root.join(format!("{key}.{COLLECTION_FILE_EXTENSION}")))
    }
}

impl KeyValueStore for FileStore {
    /// Content that is not UTF-8 is reported as `StoreError::Encoding`, which
    /// the record store treats as malformed content rather than an outage.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    key: key.to_owned(),
                    source,
                })
            }
        };

        String::from_utf8(bytes)
            .map(Some)
            .map_err(|source| StoreError::Encoding {
                key: key.to_owned(),
                source,
            })
    }

    /// Writes to a sibling temp file and renames it over the target, so a
    /// reader never sees a half-written collection.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let write_err = |source| StoreError::Write {
            key: key.to_owned(),
            source,
        };

        fs::create_dir_all(&self.root).map_err(write_err)?;
        let tmp = self
            .root
            .join(format!(".{key}.{COLLECTION_FILE_EXTENSION}.tmp"));
        fs::write(&tmp, value).map_err(write_err)?;
        fs::rename(&tmp, &path).map_err(write_err)?;

        tracing::debug!("wrote {} ({} bytes)", path.display(), value.len());
        Ok(())
    }
}

//! Record-scoped attachment storage service
//!
//! [`FilesService`] stores the bytes behind a record's attachment and hands
//! back a [`FileHandle`] that the record keeps as an opaque reference.
//!
//! # Content Addressing
//!
//! Content is stored under its SHA-256 digest inside the record's directory:
//!
//! - Identical uploads for the same record are written once
//! - The digest in the handle is checked against the bytes on every read
//! - Content files are immutable; a replacement upload gets a new file
//!
//! # Path Safety
//!
//! Collection names and record ids are both validated as [`RecordId`]s, so
//! neither can introduce separators or `..` segments. The root directory is
//! canonicalised once at construction.

use crate::{FilesError, HANDLE_FILE_NAME, HASH_ALGORITHM};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use wardview_types::{NonEmptyText, RecordId};

/// Opaque reference to an attachment, stored on the owning record.
///
/// Serialised into the record collections as a flat object and into the
/// `handle.yaml` sidecar next to the content.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct FileHandle {
    /// Hashing algorithm used (always "sha256" for current implementation)
    pub hash_algorithm: NonEmptyText,

    /// Hexadecimal digest of the content
    pub hash: NonEmptyText,

    /// Path relative to the record directory where the content is stored
    pub relative_path: NonEmptyText,

    /// Size of the content in bytes
    pub size_bytes: u64,

    /// Detected media type (MIME type), if available
    ///
    /// Best-effort detection from magic bytes; not authoritative.
    pub media_type: Option<NonEmptyText>,

    /// Filename supplied by the uploader
    pub original_filename: NonEmptyText,

    /// UTC timestamp when the content was stored
    pub stored_at: DateTime<Utc>,
}

/// Service for storing and retrieving record attachments
#[derive(Debug)]
pub struct FilesService {
    /// Canonicalised root directory holding all collections
    root_directory: PathBuf,
}

impl FilesService {
    /// Creates a new `FilesService` rooted at `root_directory`.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidRootDirectory` if the directory does not
    /// exist, is not a directory, or cannot be canonicalised.
    pub fn new(root_directory: &Path) -> Result<Self, FilesError> {
        if !root_directory.exists() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Directory does not exist: {}",
                root_directory.display()
            )));
        }

        if !root_directory.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                root_directory.display()
            )));
        }

        let root_directory = root_directory.canonicalize().map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                root_directory.display(),
                e
            ))
        })?;

        Ok(Self { root_directory })
    }

    /// Stores `bytes` as the attachment of `collection/record_id`.
    ///
    /// Any previous attachment of the record is superseded: its content file
    /// stays on disk but the handle now points at the new content.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - the collection name is not a valid path segment
    /// - `original_filename` is empty
    /// - directory creation or a write fails (I/O)
    /// - the handle sidecar cannot be serialised
    pub fn put(
        &self,
        collection: &str,
        record_id: &RecordId,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<FileHandle, FilesError> {
        let handle = self.stage(collection, record_id, original_filename, bytes)?;
        self.commit(collection, record_id, &handle)?;
        Ok(handle)
    }

    /// Writes the content of an attachment without making it current.
    ///
    /// The returned handle only takes effect once passed to
    /// [`commit`](Self::commit). Staged content that is never committed is
    /// unreachable but harmless, since content is addressed by its digest.
    pub fn stage(
        &self,
        collection: &str,
        record_id: &RecordId,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<FileHandle, FilesError> {
        let record_dir = self.record_dir(collection, record_id)?;
        let original_filename = NonEmptyText::new(original_filename).map_err(|_| {
            FilesError::InvalidPath("attachment filename cannot be empty".into())
        })?;

        let hash = hex::encode(Sha256::digest(bytes));
        let relative_path = compute_relative_path(&hash);
        let storage_path = record_dir.join(relative_path.as_str());

        if storage_path.exists() {
            tracing::debug!(
                "attachment content {} already stored for {}/{}",
                hash,
                collection,
                record_id
            );
        } else {
            if let Some(parent) = storage_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&storage_path, bytes)?;
        }

        let media_type = infer::get(bytes).and_then(|kind| NonEmptyText::new(kind.mime_type()).ok());

        let handle = FileHandle {
            hash_algorithm: text(HASH_ALGORITHM),
            hash: text(&hash),
            relative_path,
            size_bytes: bytes.len() as u64,
            media_type,
            original_filename,
            stored_at: Utc::now(),
        };

        Ok(handle)
    }

    /// Makes `handle` the current attachment of `collection/record_id`.
    pub fn commit(
        &self,
        collection: &str,
        record_id: &RecordId,
        handle: &FileHandle,
    ) -> Result<(), FilesError> {
        let record_dir = self.record_dir(collection, record_id)?;
        let handle_yaml = serde_yaml::to_string(handle)?;
        fs::write(record_dir.join(HANDLE_FILE_NAME), handle_yaml)?;
        Ok(())
    }

    /// Returns the current handle of `collection/record_id`, if any.
    pub fn handle(
        &self,
        collection: &str,
        record_id: &RecordId,
    ) -> Result<Option<FileHandle>, FilesError> {
        let handle_path = self.record_dir(collection, record_id)?.join(HANDLE_FILE_NAME);
        if !handle_path.is_file() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&handle_path)?;
        Ok(Some(serde_yaml::from_str(&contents)?))
    }

    /// Reads the attachment bytes of `collection/record_id`.
    ///
    /// Returns `Ok(None)` when the record has no attachment.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::IntegrityMismatch` if the stored bytes no longer
    /// hash to the digest recorded in the handle.
    pub fn get(&self, collection: &str, record_id: &RecordId) -> Result<Option<Vec<u8>>, FilesError> {
        let Some(handle) = self.handle(collection, record_id)? else {
            return Ok(None);
        };

        let storage_path = self
            .record_dir(collection, record_id)?
            .join(handle.relative_path.as_str());
        let bytes = fs::read(&storage_path)?;

        if hex::encode(Sha256::digest(&bytes)) != handle.hash.as_str() {
            return Err(FilesError::IntegrityMismatch {
                collection: collection.to_owned(),
                record_id: record_id.to_string(),
                expected: handle.hash.to_string(),
            });
        }

        Ok(Some(bytes))
    }

    /// Returns the root directory holding all collections.
    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    fn record_dir(&self, collection: &str, record_id: &RecordId) -> Result<PathBuf, FilesError> {
        let collection = RecordId::parse(collection)
            .map_err(|e| FilesError::InvalidPath(format!("collection name: {e}")))?;
        Ok(self
            .root_directory
            .join(collection.as_str())
            .join(record_id.as_str()))
    }
}

/// Relative path of content inside a record directory: `sha256/<s1>/<s2>/<hash>`.
fn compute_relative_path(hash_hex: &str) -> NonEmptyText {
    text(&format!(
        "{}/{}/{}/{}",
        HASH_ALGORITHM,
        &hash_hex[0..2],
        &hash_hex[2..4],
        hash_hex
    ))
}

fn text(value: &str) -> NonEmptyText {
    NonEmptyText::new(value).expect("value is non-empty by construction")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn service(temp: &TempDir) -> FilesService {
        FilesService::new(temp.path()).expect("root exists")
    }

    fn id(raw: &str) -> RecordId {
        RecordId::parse(raw).unwrap()
    }

    #[test]
    fn test_new_rejects_missing_root() {
        let temp = TempDir::new().unwrap();
        let result = FilesService::new(&temp.path().join("absent"));
        assert!(matches!(result, Err(FilesError::InvalidRootDirectory(_))));
    }

    #[test]
    fn test_new_rejects_file_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("file.txt");
        fs::write(&root, "not a directory").unwrap();

        let result = FilesService::new(&root);
        assert!(matches!(result, Err(FilesError::InvalidRootDirectory(_))));
    }

    #[test]
    fn test_put_and_get_attachment() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);
        let record = id("LAB-0001");

        let handle = service
            .put("labResults", &record, "cbc.txt", b"Haemoglobin 13.2")
            .unwrap();

        assert_eq!(handle.hash_algorithm.as_str(), "sha256");
        assert_eq!(handle.hash.as_str().len(), 64);
        assert_eq!(handle.size_bytes, 16);
        assert_eq!(handle.original_filename.as_str(), "cbc.txt");
        assert!(handle.relative_path.as_str().starts_with("sha256/"));

        let bytes = service.get("labResults", &record).unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"Haemoglobin 13.2"[..]));
    }

    #[test]
    fn test_staged_content_is_invisible_until_committed() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);
        let record = id("IMG-0002");

        let handle = service
            .stage("imagingResults", &record, "chest.dcm", b"DICM scan")
            .unwrap();
        assert_eq!(service.get("imagingResults", &record).unwrap(), None);

        service.commit("imagingResults", &record, &handle).unwrap();
        let bytes = service.get("imagingResults", &record).unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"DICM scan"[..]));
    }

    #[test]
    fn test_get_without_attachment_returns_none() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);

        assert_eq!(service.get("imagingResults", &id("IMG-0009")).unwrap(), None);
        assert_eq!(service.handle("imagingResults", &id("IMG-0009")).unwrap(), None);
    }

    #[test]
    fn test_put_replaces_handle() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);
        let record = id("P001");

        let first = service.put("patients", &record, "a.txt", b"first").unwrap();
        let second = service.put("patients", &record, "b.txt", b"second").unwrap();

        assert_ne!(first.hash, second.hash);
        assert_eq!(service.handle("patients", &record).unwrap(), Some(second));
        assert_eq!(
            service.get("patients", &record).unwrap(),
            Some(b"second".to_vec())
        );
    }

    #[test]
    fn test_put_same_content_twice_is_accepted() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);
        let record = id("P001");

        let first = service.put("patients", &record, "a.txt", b"same").unwrap();
        let second = service.put("patients", &record, "a.txt", b"same").unwrap();
        assert_eq!(first.hash, second.hash);
    }

    #[test]
    fn test_attachments_are_scoped_per_record() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);

        service.put("labResults", &id("LAB-0001"), "a.txt", b"one").unwrap();
        service.put("labResults", &id("LAB-0002"), "b.txt", b"two").unwrap();

        assert_eq!(
            service.get("labResults", &id("LAB-0001")).unwrap(),
            Some(b"one".to_vec())
        );
        assert_eq!(
            service.get("labResults", &id("LAB-0002")).unwrap(),
            Some(b"two".to_vec())
        );
    }

    #[test]
    fn test_detects_png_media_type() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

        let handle = service
            .put("imagingResults", &id("IMG-0001"), "chest.png", &png_header)
            .unwrap();

        assert_eq!(
            handle.media_type.as_ref().map(|t| t.as_str()),
            Some("image/png")
        );
    }

    #[test]
    fn test_get_detects_tampered_content() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);
        let record = id("LAB-0001");

        let handle = service.put("labResults", &record, "cbc.txt", b"original").unwrap();
        let stored = service
            .root_directory()
            .join("labResults")
            .join("LAB-0001")
            .join(handle.relative_path.as_str());
        fs::write(stored, b"tampered").unwrap();

        let result = service.get("labResults", &record);
        assert!(matches!(result, Err(FilesError::IntegrityMismatch { .. })));
    }

    #[test]
    fn test_rejects_unsafe_collection_name() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);

        let result = service.put("../escape", &id("P001"), "a.txt", b"x");
        assert!(matches!(result, Err(FilesError::InvalidPath(_))));
    }

    #[test]
    fn test_rejects_empty_filename() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);

        let result = service.put("patients", &id("P001"), "  ", b"x");
        assert!(matches!(result, Err(FilesError::InvalidPath(_))));
    }

    #[test]
    fn test_compute_relative_path_sharding() {
        let hash = "abcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890";
        assert_eq!(
            compute_relative_path(hash).as_str(),
            format!("sha256/ab/cd/{}", hash)
        );
    }

    #[test]
    fn test_handle_serialises_as_flat_object() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);
        let handle = service.put("patients", &id("P001"), "scan.txt", b"scan").unwrap();

        let json = serde_json::to_value(&handle).unwrap();
        assert_eq!(json["hash_algorithm"], "sha256");
        assert_eq!(json["original_filename"], "scan.txt");
        assert_eq!(json["size_bytes"], 4);
    }
}

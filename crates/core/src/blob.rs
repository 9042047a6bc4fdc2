//! Attachment storage seen from the core.
//!
//! The core never interprets attachment bytes. It hands them to a
//! [`BlobStore`] and keeps the returned [`FileHandle`] on the owning record.
//!
//! Storing is two-phase: [`BlobStore::stage`] writes content, and
//! [`BlobStore::commit`] makes the handle current. Record actions commit only
//! after the owning record has been saved with the handle.

use crate::CoreResult;
use wardview_files::{FileHandle, FilesService};
use wardview_types::RecordId;

pub trait BlobStore {
    fn stage(
        &self,
        collection: &str,
        record_id: &RecordId,
        original_filename: &str,
        bytes: &[u8],
    ) -> CoreResult<FileHandle>;

    fn commit(&self, collection: &str, record_id: &RecordId, handle: &FileHandle)
        -> CoreResult<()>;

    /// `Ok(None)` when the record has no attachment.
    fn get(&self, collection: &str, record_id: &RecordId) -> CoreResult<Option<Vec<u8>>>;

    /// Stage and commit in one step.
    fn put(
        &self,
        collection: &str,
        record_id: &RecordId,
        original_filename: &str,
        bytes: &[u8],
    ) -> CoreResult<FileHandle> {
        let handle = self.stage(collection, record_id, original_filename, bytes)?;
        self.commit(collection, record_id, &handle)?;
        Ok(handle)
    }
}

impl BlobStore for FilesService {
    fn stage(
        &self,
        collection: &str,
        record_id: &RecordId,
        original_filename: &str,
        bytes: &[u8],
    ) -> CoreResult<FileHandle> {
        Ok(FilesService::stage(self, collection, record_id, original_filename, bytes)?)
    }

    fn commit(
        &self,
        collection: &str,
        record_id: &RecordId,
        handle: &FileHandle,
    ) -> CoreResult<()> {
        Ok(FilesService::commit(self, collection, record_id, handle)?)
    }

    fn get(&self, collection: &str, record_id: &RecordId) -> CoreResult<Option<Vec<u8>>> {
        Ok(FilesService::get(self, collection, record_id)?)
    }
}

//! Wardview attachment storage
//!
//! Binary files attached to clinical records (lab report PDFs, imaging
//! exports, scanned patient documents) live outside the record collections.
//! A record only carries an opaque [`FileHandle`]; the bytes are stored here.
//!
//! ## Storage Model
//!
//! - Attachments are addressed by `(collection, record_id)`
//! - Content is stored under its SHA-256 digest and never modified in place
//! - Replacing an attachment writes a new content file and repoints the handle
//! - Content is verified against its digest on every read
//!
//! ```text
//! <root>/
//! └── <collection>/
//!     └── <record_id>/
//!         ├── handle.yaml
//!         └── sha256/
//!             └── ab/
//!                 └── cd/
//!                     └── abcd3f9e…
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use wardview_files::FilesService;
//! use wardview_types::RecordId;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = FilesService::new(Path::new("ward_data/files"))?;
//! let record = RecordId::parse("LAB-0001")?;
//! let handle = service.put("labResults", &record, "cbc.pdf", b"%PDF-1.7")?;
//! assert_eq!(service.get("labResults", &record)?, Some(b"%PDF-1.7".to_vec()));
//! # let _ = handle;
//! # Ok(())
//! # }
//! ```

mod constants;
mod files;

pub use constants::{HANDLE_FILE_NAME, HASH_ALGORITHM};
pub use files::{FileHandle, FilesService};

/// Errors that can occur during attachment operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Root directory does not exist or is not a directory
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// Collection name or record id cannot be used as a path segment
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Stored bytes no longer match the digest recorded in the handle
    #[error("Content for {collection}/{record_id} does not match digest {expected}")]
    IntegrityMismatch {
        collection: String,
        record_id: String,
        expected: String,
    },

    /// Handle sidecar could not be read or written
    #[error("Invalid handle file: {0}")]
    Handle(#[from] serde_yaml::Error),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

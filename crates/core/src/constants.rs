//! Constants used throughout the Wardview core crate.
//!
//! Collection keys are the names records are stored under in the key-value
//! substrate; they are part of the stored data format and must not change.

/// Default directory for collection storage when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "ward_data";

/// Directory name (under the data directory) for attachment storage.
pub const FILES_DIR_NAME: &str = "files";

/// File extension used by the file-backed key-value store.
pub const COLLECTION_FILE_EXTENSION: &str = "json";

/// Key holding the list of collections that have been initialised.
pub const INITIALISED_KEY: &str = "__wardview_initialised";

/// Cell value shown for a patient without any related record.
pub const NO_RECORD_MARKER: &str = "No record";

pub const PATIENTS_COLLECTION: &str = "patients";
pub const STAFF_COLLECTION: &str = "staff";
pub const MEDICATIONS_COLLECTION: &str = "medications";
pub const LAB_RESULTS_COLLECTION: &str = "labResults";
pub const IMAGING_RESULTS_COLLECTION: &str = "imagingResults";
pub const VITALS_COLLECTION: &str = "vitals";
pub const DISPENSING_COLLECTION: &str = "dispensing";
pub const QC_RECORDS_COLLECTION: &str = "qcRecords";
pub const UNAVAILABLE_MEDICATIONS_COLLECTION: &str = "unavailableMedications";
pub const MED_ORDERS_COLLECTION: &str = "medOrders";
pub const ANNOUNCEMENTS_COLLECTION: &str = "announcements";

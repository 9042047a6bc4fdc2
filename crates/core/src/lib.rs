//! # Wardview Core
//!
//! Role-based access and view composition for the Wardview clinical records
//! dashboard.
//!
//! This crate contains:
//! - the role profile registry (what each role may see, change and navigate to)
//! - typed record collections and the record store accessor over a key-value substrate
//! - per-patient aggregation ("latest record" and history joins)
//! - the view composer and dashboard controller
//! - record actions gated by the same checks as the composer's affordances
//!
//! **No API concerns**: HTTP servers, CLI parsing and rendering belong in
//! `api-rest`, `cli` and `api-shared`.

pub mod access;
pub mod actions;
pub mod aggregate;
pub mod blob;
pub mod compose;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod records;
pub mod roles;
pub mod session;
pub mod store;
pub mod validation;

pub use actions::RecordActions;
pub use aggregate::{history_for, latest_for, latest_for_by, LatestByPatient, PatientTimeline};
pub use blob::BlobStore;
pub use compose::{compose_page, PageId, PageViewModel};
pub use config::CoreConfig;
pub use dashboard::{Dashboard, Renderer};
pub use data::DashboardData;
pub use error::{CoreError, CoreResult};
pub use roles::{Action, Category, MenuEntry, Role, RoleProfile, RoleProfileRegistry};
pub use session::{DashboardSession, SessionUser};
pub use store::{FileStore, KeyValueStore, MemoryStore, RecordStore, SeedData, StoreError};

pub use wardview_files::{FileHandle, FilesService};
pub use wardview_types::{NonEmptyText, RecordId, TextError};

//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the
//! store and dashboard. Nothing in the core reads environment variables while
//! composing pages or handling requests.

use crate::constants::FILES_DIR_NAME;
use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    files_dir: PathBuf,
    seed_demo_data: bool,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `files_dir` defaults to `<data_dir>/files` when not given.
    pub fn new(
        data_dir: PathBuf,
        files_dir: Option<PathBuf>,
        seed_demo_data: bool,
    ) -> CoreResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(CoreError::InvalidInput("data_dir cannot be empty".into()));
        }

        let files_dir = files_dir.unwrap_or_else(|| data_dir.join(FILES_DIR_NAME));

        Ok(Self {
            data_dir,
            files_dir,
            seed_demo_data,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    /// Whether demo data should be seeded into never-initialised collections.
    pub fn seed_demo_data(&self) -> bool {
        self.seed_demo_data
    }

    /// Create the data and attachment directories if they do not exist yet.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.data_dir).map_err(CoreError::DataDirCreation)?;
        std::fs::create_dir_all(&self.files_dir).map_err(CoreError::DataDirCreation)?;
        Ok(())
    }
}

/// Parse the seed-on-start flag from an optional string value.
///
/// If `value` is `None` or empty/whitespace, seeding is enabled.
pub fn seed_flag_from_env_value(value: Option<String>) -> CoreResult<bool> {
    let value = value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty());

    match value.as_deref() {
        None | Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(CoreError::InvalidInput(format!(
            "unrecognised seed flag '{other}' (expected true/false)"
        ))),
    }
}

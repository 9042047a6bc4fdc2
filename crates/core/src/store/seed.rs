//! Demo contents for every collection.
//!
//! The table is bundled as JSON and applied through
//! [`RecordStore::seed_all`](super::RecordStore::seed_all), which only touches
//! collections that were never initialised.

use crate::data::DashboardData;
use serde::Deserialize;

const DEMO_JSON: &str = include_str!("seed_demo.json");

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct SeedData(DashboardData);

impl SeedData {
    /// The bundled demo dataset.
    pub fn demo() -> Self {
        serde_json::from_str(DEMO_JSON).expect("bundled demo data matches the record shapes")
    }

    pub fn from_collections(collections: DashboardData) -> Self {
        Self(collections)
    }

    pub fn collections(&self) -> &DashboardData {
        &self.0
    }
}

//! Facility-scoped records: not tied to any one patient.

use crate::constants::{
    MED_ORDERS_COLLECTION, QC_RECORDS_COLLECTION, UNAVAILABLE_MEDICATIONS_COLLECTION,
};
use crate::roles::{Category, Role};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use wardview_types::{NonEmptyText, RecordId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QcOutcome {
    Pass,
    Fail,
}

/// An instrument quality-control run. Stored in `qcRecords`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QcRecord {
    pub id: RecordId,
    pub instrument: NonEmptyText,
    pub test_name: NonEmptyText,
    pub outcome: QcOutcome,
    #[serde(default)]
    pub notes: Option<String>,
    pub recorded_date: NaiveDate,
    #[serde(with = "super::clock")]
    pub recorded_time: NaiveTime,
    pub author_role: Role,
}

/// A medication the pharmacy currently cannot supply. Stored in `unavailableMedications`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UnavailableMedication {
    pub id: RecordId,
    pub medication: NonEmptyText,
    pub reason: NonEmptyText,
    #[serde(default)]
    pub expected_restock: Option<NaiveDate>,
    pub recorded_date: NaiveDate,
    #[serde(with = "super::clock")]
    pub recorded_time: NaiveTime,
    pub author_role: Role,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Ordered,
    Received,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Ordered => "Ordered",
            OrderStatus::Received => "Received",
        }
    }
}

/// A restocking order placed with a supplier. Stored in `medOrders`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MedOrder {
    pub id: RecordId,
    pub medication: NonEmptyText,
    pub quantity: u32,
    pub supplier: NonEmptyText,
    pub status: OrderStatus,
    pub recorded_date: NaiveDate,
    #[serde(with = "super::clock")]
    pub recorded_time: NaiveTime,
    pub author_role: Role,
}

impl_record!(QcRecord, QC_RECORDS_COLLECTION, Category::QualityControl, "QC-", 4);
impl_record!(
    UnavailableMedication,
    UNAVAILABLE_MEDICATIONS_COLLECTION,
    Category::Inventory,
    "UM-",
    4
);
impl_record!(MedOrder, MED_ORDERS_COLLECTION, Category::Orders, "ORD-", 4);

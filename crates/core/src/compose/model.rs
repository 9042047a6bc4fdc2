//! Render-agnostic page output.

use serde::Serialize;

/// Which rule produced a view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    Content,
    NotImplemented,
    Restricted,
}

/// A mutation the renderer may offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Affordance {
    Add,
    Edit,
    Delete,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    /// Patient id on per-patient pages, record id elsewhere.
    pub key: String,
    /// Record the row actions apply to. `None` for placeholder rows.
    pub record_id: Option<String>,
    pub cells: Vec<String>,
    pub actions: Vec<Affordance>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DetailSection {
    pub heading: String,
    pub lines: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerLevel {
    Info,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub level: BannerLevel,
    pub text: String,
}

/// Everything a renderer needs to draw one page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageViewModel {
    pub page_id: String,
    pub title: String,
    pub role: String,
    pub status: PageStatus,
    pub columns: Vec<String>,
    pub summary_rows: Vec<SummaryRow>,
    pub detail_sections: Vec<DetailSection>,
    /// Page-level affordances (`Add`).
    pub actions: Vec<Affordance>,
    pub banner_slots: Vec<Banner>,
}

impl PageViewModel {
    pub fn new(page_id: impl Into<String>, title: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            title: title.into(),
            role: role.into(),
            status: PageStatus::Content,
            columns: Vec::new(),
            summary_rows: Vec::new(),
            detail_sections: Vec::new(),
            actions: Vec::new(),
            banner_slots: Vec::new(),
        }
    }

    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| (*c).to_owned()).collect();
        self
    }

    pub fn banner(&mut self, level: BannerLevel, text: impl Into<String>) {
        self.banner_slots.push(Banner {
            level,
            text: text.into(),
        });
    }

    pub fn row(&self, key: &str) -> Option<&SummaryRow> {
        self.summary_rows.iter().find(|r| r.key == key)
    }
}

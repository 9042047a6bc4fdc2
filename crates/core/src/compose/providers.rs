//! Per-role page content.
//!
//! Every page has a method on [`RoleContentProvider`] with a shared default.
//! Roles whose pages differ override only those pages: Admin gets a system
//! overview, Patient sees nothing but their own record.

use super::model::{Affordance, BannerLevel, DetailSection, PageViewModel, SummaryRow};
use super::pages::PageId;
use super::rows::RowSource;
use crate::aggregate::{PatientIndex, PatientTimeline};
use crate::constants::NO_RECORD_MARKER;
use crate::data::DashboardData;
use crate::records::{PatientScoped, Patient, PatientStatus, QcOutcome, Record};
use crate::roles::{Category, Role, RoleProfile};
use crate::session::SessionUser;

/// Which mutations the page offers, after every override has been applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Grants {
    pub add: bool,
    pub edit: bool,
    pub delete: bool,
}

/// Inputs shared by every page builder.
pub struct PageContext<'a> {
    pub session: &'a SessionUser,
    pub profile: &'a RoleProfile,
    pub data: &'a DashboardData,
    pub page: PageId,
    pub grants: Grants,
}

impl PageContext<'_> {
    fn view(&self) -> PageViewModel {
        let mut view = PageViewModel::new(
            self.page.as_str(),
            self.page.title(),
            self.session.role_label(),
        );
        if self.grants.add {
            view.actions.push(Affordance::Add);
        }
        view
    }

    fn row_actions(&self) -> Vec<Affordance> {
        let mut actions = Vec::new();
        if self.grants.edit {
            actions.push(Affordance::Edit);
        }
        if self.grants.delete {
            actions.push(Affordance::Delete);
        }
        actions
    }

    fn record_row<R: Record + RowSource>(&self, record: &R) -> SummaryRow {
        SummaryRow {
            key: record.id().to_string(),
            record_id: Some(record.id().to_string()),
            cells: record.cells(),
            actions: self.row_actions(),
        }
    }

    fn everyone(&self) -> Vec<&Patient> {
        self.data.patients.iter().collect()
    }

    /// The session's own patient, if linked and registered.
    fn own(&self) -> Vec<&Patient> {
        self.session
            .patient_id()
            .and_then(|id| self.data.patients.iter().find(|p| p.id.as_str() == id))
            .into_iter()
            .collect()
    }
}

/// Patient-scoped pages, one per clinical collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClinicalPage {
    Prescriptions,
    LabResults,
    Imaging,
    Vitals,
    Dispensing,
}

pub trait RoleContentProvider: Sync {
    fn overview(&self, ctx: &PageContext<'_>) -> PageViewModel {
        overview(ctx)
    }

    fn all_patients(&self, ctx: &PageContext<'_>) -> PageViewModel {
        roster(ctx)
    }

    fn register_staff(&self, ctx: &PageContext<'_>) -> PageViewModel {
        staff_registry(ctx)
    }

    fn patient_summary(&self, ctx: &PageContext<'_>) -> PageViewModel {
        patient_summary(ctx, &ctx.everyone())
    }

    fn clinical(&self, ctx: &PageContext<'_>, page: ClinicalPage) -> PageViewModel {
        clinical(ctx, page, &ctx.everyone())
    }

    fn inventory(&self, ctx: &PageContext<'_>) -> PageViewModel {
        record_table(ctx, &ctx.data.unavailable_medications)
    }

    fn quality_control(&self, ctx: &PageContext<'_>) -> PageViewModel {
        quality_control(ctx)
    }

    fn med_orders(&self, ctx: &PageContext<'_>) -> PageViewModel {
        record_table(ctx, &ctx.data.med_orders)
    }

    fn announcements(&self, ctx: &PageContext<'_>) -> PageViewModel {
        announcements(ctx)
    }

    fn my_records(&self, ctx: &PageContext<'_>) -> PageViewModel {
        my_records(ctx)
    }
}

/// Clinical and facility staff.
pub struct StaffContent;

impl RoleContentProvider for StaffContent {}

pub struct AdminContent;

impl RoleContentProvider for AdminContent {
    fn overview(&self, ctx: &PageContext<'_>) -> PageViewModel {
        let mut view = overview(ctx);
        let data = ctx.data;

        let by_status = [
            PatientStatus::Active,
            PatientStatus::Admitted,
            PatientStatus::Discharged,
        ]
        .into_iter()
        .map(|status| {
            let n = data.patients.iter().filter(|p| p.status == status).count();
            format!("{}: {}", status.as_str(), n)
        })
        .collect();
        view.detail_sections.push(DetailSection {
            heading: "Patients by status".into(),
            lines: by_status,
        });

        let by_role = Role::ALL
            .into_iter()
            .filter(|role| *role != Role::Patient)
            .map(|role| {
                let n = data.staff.iter().filter(|s| s.role == role).count();
                format!("{}: {}", role, n)
            })
            .collect();
        view.detail_sections.push(DetailSection {
            heading: "Staff by role".into(),
            lines: by_role,
        });

        view
    }
}

pub struct PatientContent;

impl RoleContentProvider for PatientContent {
    fn overview(&self, ctx: &PageContext<'_>) -> PageViewModel {
        let mut view = ctx.view().with_columns(&["Record", "Count"]);
        if let Some(timeline) = ctx
            .session
            .patient_id()
            .and_then(|id| PatientTimeline::build(ctx.data, id))
        {
            let counts = [
                ("Prescriptions", timeline.medications.len()),
                ("Lab results", timeline.lab_results.len()),
                ("Imaging results", timeline.imaging_results.len()),
                ("Vital signs", timeline.vitals.len()),
            ];
            view.summary_rows = counts
                .into_iter()
                .map(|(label, n)| SummaryRow {
                    key: label.to_owned(),
                    record_id: None,
                    cells: vec![label.to_owned(), n.to_string()],
                    actions: Vec::new(),
                })
                .collect();
        }
        announcement_banners(ctx, &mut view);
        view
    }

    fn all_patients(&self, ctx: &PageContext<'_>) -> PageViewModel {
        let mut view = ctx.view().with_columns(Patient::COLUMNS);
        let own_id = ctx.session.patient_id().unwrap_or_default();

        let row = match ctx.own().first() {
            Some(patient) => ctx.record_row(*patient),
            None => {
                view.banner(
                    BannerLevel::Warning,
                    "Your patient record could not be found. Please contact the front desk.",
                );
                placeholder_row(own_id, "Not registered", Patient::COLUMNS.len())
            }
        };
        view.summary_rows.push(row);
        view
    }

    fn patient_summary(&self, ctx: &PageContext<'_>) -> PageViewModel {
        patient_summary(ctx, &ctx.own())
    }

    fn clinical(&self, ctx: &PageContext<'_>, page: ClinicalPage) -> PageViewModel {
        clinical(ctx, page, &ctx.own())
    }
}

static ADMIN: AdminContent = AdminContent;
static PATIENT: PatientContent = PatientContent;
static STAFF: StaffContent = StaffContent;

/// The provider for a session role. Unrecognised roles get the shared defaults.
pub fn provider_for(role: Option<Role>) -> &'static dyn RoleContentProvider {
    match role {
        Some(Role::Admin) => &ADMIN,
        Some(Role::Patient) => &PATIENT,
        _ => &STAFF,
    }
}

/// Route a page to its provider method.
pub fn render(provider: &dyn RoleContentProvider, ctx: &PageContext<'_>) -> PageViewModel {
    match ctx.page {
        PageId::Overview => provider.overview(ctx),
        PageId::AllPatients => provider.all_patients(ctx),
        PageId::RegisterStaff => provider.register_staff(ctx),
        PageId::PatientSummary => provider.patient_summary(ctx),
        PageId::Prescriptions => provider.clinical(ctx, ClinicalPage::Prescriptions),
        PageId::LabResults => provider.clinical(ctx, ClinicalPage::LabResults),
        PageId::Imaging => provider.clinical(ctx, ClinicalPage::Imaging),
        PageId::Vitals => provider.clinical(ctx, ClinicalPage::Vitals),
        PageId::Dispensing => provider.clinical(ctx, ClinicalPage::Dispensing),
        PageId::Inventory => provider.inventory(ctx),
        PageId::QualityControl => provider.quality_control(ctx),
        PageId::MedOrders => provider.med_orders(ctx),
        PageId::Announcements => provider.announcements(ctx),
        PageId::MyRecords => provider.my_records(ctx),
    }
}

// ============================================================================
// SHARED PAGE BUILDERS
// ============================================================================

fn placeholder_row(key: &str, label: &str, width: usize) -> SummaryRow {
    let mut cells = vec![key.to_owned(), label.to_owned()];
    cells.resize(width.max(2), String::new());
    SummaryRow {
        key: key.to_owned(),
        record_id: None,
        cells,
        actions: Vec::new(),
    }
}

fn announcement_banners(ctx: &PageContext<'_>, view: &mut PageViewModel) {
    let Some(role) = ctx.session.role() else {
        return;
    };
    for a in ctx.data.announcements.iter().filter(|a| a.visible_to_role(role)) {
        view.banner(BannerLevel::Info, format!("{}: {}", a.title, a.description));
    }
}

fn overview(ctx: &PageContext<'_>) -> PageViewModel {
    let mut view = ctx.view().with_columns(&["Category", "Records"]);

    view.summary_rows = Category::ALL
        .into_iter()
        .filter(|c| ctx.profile.can_view(*c))
        .map(|c| SummaryRow {
            key: c.as_str().to_owned(),
            record_id: None,
            cells: vec![c.as_str().to_owned(), ctx.data.count(c).to_string()],
            actions: Vec::new(),
        })
        .collect();

    if !ctx.profile.denied_actions().is_empty() {
        view.detail_sections.push(DetailSection {
            heading: "Restrictions".into(),
            lines: ctx
                .profile
                .denied_actions()
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
        });
    }

    announcement_banners(ctx, &mut view);
    view
}

fn roster(ctx: &PageContext<'_>) -> PageViewModel {
    record_table(ctx, &ctx.data.patients)
}

fn staff_registry(ctx: &PageContext<'_>) -> PageViewModel {
    record_table(ctx, &ctx.data.staff)
}

fn record_table<R: Record + RowSource>(ctx: &PageContext<'_>, records: &[R]) -> PageViewModel {
    let mut view = ctx.view().with_columns(R::COLUMNS);
    view.summary_rows = records.iter().map(|r| ctx.record_row(r)).collect();
    view
}

fn quality_control(ctx: &PageContext<'_>) -> PageViewModel {
    let mut view = record_table(ctx, &ctx.data.qc_records);
    let failed = ctx
        .data
        .qc_records
        .iter()
        .filter(|r| r.outcome == QcOutcome::Fail)
        .count();
    if failed > 0 {
        view.banner(
            BannerLevel::Warning,
            format!("{failed} quality control run(s) failed. Review before releasing results."),
        );
    }
    view
}

fn announcements(ctx: &PageContext<'_>) -> PageViewModel {
    let mut view = ctx.view().with_columns(crate::records::Announcement::COLUMNS);
    if let Some(role) = ctx.session.role() {
        view.summary_rows = ctx
            .data
            .announcements
            .iter()
            .filter(|a| a.visible_to_role(role))
            .map(|a| ctx.record_row(a))
            .collect();
    }
    view
}

fn clinical(ctx: &PageContext<'_>, page: ClinicalPage, shown: &[&Patient]) -> PageViewModel {
    let data = ctx.data;
    match page {
        ClinicalPage::Prescriptions => per_patient(ctx, shown, &data.medications),
        ClinicalPage::LabResults => per_patient(ctx, shown, &data.lab_results),
        ClinicalPage::Imaging => per_patient(ctx, shown, &data.imaging_results),
        ClinicalPage::Vitals => per_patient(ctx, shown, &data.vitals),
        ClinicalPage::Dispensing => per_patient(ctx, shown, &data.dispensing),
    }
}

/// One row per shown patient with their latest record, plus a history section
/// for each patient that has any.
fn per_patient<R>(ctx: &PageContext<'_>, shown: &[&Patient], related: &[R]) -> PageViewModel
where
    R: Record + RowSource + PatientScoped,
{
    let mut columns = vec!["Patient ID", "Patient"];
    columns.extend_from_slice(R::COLUMNS);
    let mut view = ctx.view().with_columns(&columns);

    let index = PatientIndex::build(&ctx.data.patients, related, |r| r.patient_id());

    for patient in shown {
        let id = patient.id.as_str();
        let row = match index.latest(id) {
            Some(latest) => {
                let mut cells = vec![id.to_owned(), patient.full_name.to_string()];
                cells.extend(latest.cells());
                SummaryRow {
                    key: id.to_owned(),
                    record_id: Some(latest.id().to_string()),
                    cells,
                    actions: ctx.row_actions(),
                }
            }
            None => {
                let mut row = placeholder_row(id, patient.full_name.as_str(), columns.len());
                row.cells[2] = NO_RECORD_MARKER.to_owned();
                row
            }
        };
        view.summary_rows.push(row);

        let history = index.history(id);
        if !history.is_empty() {
            view.detail_sections.push(DetailSection {
                heading: format!("{} ({})", patient.full_name, id),
                lines: history.iter().map(|r| r.describe()).collect(),
            });
        }
    }

    view
}

fn patient_summary(ctx: &PageContext<'_>, shown: &[&Patient]) -> PageViewModel {
    let data = ctx.data;
    let mut view = ctx.view().with_columns(&[
        "Patient ID",
        "Patient",
        "Latest medication",
        "Latest lab",
        "Latest imaging",
        "Latest vitals",
    ]);

    let meds = PatientIndex::build(&data.patients, &data.medications, |r| r.patient_id());
    let labs = PatientIndex::build(&data.patients, &data.lab_results, |r| r.patient_id());
    let imaging = PatientIndex::build(&data.patients, &data.imaging_results, |r| r.patient_id());
    let vitals = PatientIndex::build(&data.patients, &data.vitals, |r| r.patient_id());

    fn latest_cell<R: RowSource>(latest: Option<&R>) -> String {
        latest
            .map(RowSource::describe)
            .unwrap_or_else(|| NO_RECORD_MARKER.to_owned())
    }

    view.summary_rows = shown
        .iter()
        .map(|p| {
            let id = p.id.as_str();
            SummaryRow {
                key: id.to_owned(),
                record_id: None,
                cells: vec![
                    id.to_owned(),
                    p.full_name.to_string(),
                    latest_cell(meds.latest(id)),
                    latest_cell(labs.latest(id)),
                    latest_cell(imaging.latest(id)),
                    latest_cell(vitals.latest(id)),
                ],
                actions: Vec::new(),
            }
        })
        .collect();

    view
}

fn my_records(ctx: &PageContext<'_>) -> PageViewModel {
    let mut view = ctx.view().with_columns(Patient::COLUMNS);

    let Some(patient_id) = ctx.session.patient_id() else {
        view.banner(BannerLevel::Info, "No patient record is linked to this session.");
        return view;
    };
    let Some(timeline) = PatientTimeline::build(ctx.data, patient_id) else {
        view.banner(
            BannerLevel::Warning,
            format!("Patient {patient_id} is not registered."),
        );
        view.summary_rows
            .push(placeholder_row(patient_id, "Not registered", Patient::COLUMNS.len()));
        return view;
    };

    view.summary_rows.push(SummaryRow {
        key: patient_id.to_owned(),
        record_id: Some(patient_id.to_owned()),
        cells: timeline.patient.cells(),
        actions: Vec::new(),
    });

    fn section<R: RowSource>(heading: &str, records: &[&R]) -> DetailSection {
        let lines = if records.is_empty() {
            vec![NO_RECORD_MARKER.to_owned()]
        } else {
            records.iter().map(|r| r.describe()).collect()
        };
        DetailSection {
            heading: heading.to_owned(),
            lines,
        }
    }

    view.detail_sections = vec![
        section("Prescriptions", &timeline.medications),
        section("Lab results", &timeline.lab_results),
        section("Imaging results", &timeline.imaging_results),
        section("Vital signs", &timeline.vitals),
        section("Dispensed medication", &timeline.dispensing),
    ];

    view
}

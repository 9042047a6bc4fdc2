//! View composition.
//!
//! [`compose_page`] turns a session, a page id and a data snapshot into a
//! [`PageViewModel`]. The rules run in a fixed order:
//!
//! 1. an unknown page id yields a "not yet implemented" placeholder;
//! 2. a page whose category the role cannot view yields a restricted view;
//! 3. otherwise the role's [`RoleContentProvider`] builds the page, with the
//!    affordances decided up front by the role profile and page overrides.

mod model;
mod pages;
mod providers;
mod rows;

pub use model::{
    Affordance, Banner, BannerLevel, DetailSection, PageStatus, PageViewModel, SummaryRow,
};
pub use pages::PageId;
pub use providers::{
    provider_for, AdminContent, ClinicalPage, Grants, PageContext, PatientContent,
    RoleContentProvider, StaffContent,
};
pub use rows::RowSource;

use crate::access::mutation_allowed;
use crate::data::DashboardData;
use crate::roles::{Action, RoleProfile};
use crate::session::SessionUser;

const PLACEHOLDER_CATEGORY_COUNT: usize = 3;

/// Compose the view of `page_id` for `session` over `data`.
pub fn compose_page(session: &SessionUser, page_id: &str, data: &DashboardData) -> PageViewModel {
    let profile = session.profile();

    let Some(page) = PageId::parse(page_id) else {
        tracing::debug!("page '{}' has no composer, showing placeholder", page_id);
        return not_implemented(session, profile, page_id);
    };

    if let Some(category) = page.category() {
        if !profile.can_view(category) {
            tracing::debug!("{} cannot view {}, restricting {}", session.role_label(), category, page);
            return restricted(session, page);
        }
    }

    let ctx = PageContext {
        session,
        profile,
        data,
        page,
        grants: grants(profile, page),
    };
    let view = providers::render(provider_for(session.role()), &ctx);
    tracing::debug!(
        "composed {} for {}: {} row(s)",
        page,
        session.role_label(),
        view.summary_rows.len()
    );
    view
}

/// Affordances for `page`: the profile sets first, then the page overrides.
pub fn grants(profile: &RoleProfile, page: PageId) -> Grants {
    let Some(category) = page.category() else {
        return Grants::default();
    };
    if page.is_read_only() {
        return Grants::default();
    }

    Grants {
        add: mutation_allowed(profile, Action::Insert, category),
        edit: mutation_allowed(profile, Action::Update, category),
        delete: mutation_allowed(profile, Action::Delete, category),
    }
}

fn not_implemented(session: &SessionUser, profile: &RoleProfile, page_id: &str) -> PageViewModel {
    let mut view = PageViewModel::new(page_id, "Not yet implemented", session.role_label());
    view.status = PageStatus::NotImplemented;

    let categories: Vec<&str> = profile
        .first_viewable(PLACEHOLDER_CATEGORY_COUNT)
        .into_iter()
        .map(|c| c.as_str())
        .collect();
    let summary = if categories.is_empty() {
        "none".to_owned()
    } else {
        categories.join(", ")
    };

    view.banner(
        BannerLevel::Info,
        format!("The '{page_id}' section is not yet implemented."),
    );
    view.detail_sections.push(DetailSection {
        heading: "Your access".into(),
        lines: vec![
            format!("Role: {}", session.role_label()),
            format!("Viewable: {summary}"),
        ],
    });
    view
}

fn restricted(session: &SessionUser, page: PageId) -> PageViewModel {
    let mut view = PageViewModel::new(page.as_str(), page.title(), session.role_label());
    view.status = PageStatus::Restricted;
    view.banner(
        BannerLevel::Warning,
        format!("Access restricted: {} cannot view this section.", session.role_label()),
    );
    view
}

//! Dashboard controller.
//!
//! Owns one session's navigation. Every page selection reads the collections
//! afresh, composes the page and hands it to a [`Renderer`]. Selecting a page
//! never writes to the store, so selecting the same page again yields the
//! same view.

use crate::compose::{compose_page, PageViewModel};
use crate::data::DashboardData;
use crate::roles::MenuEntry;
use crate::session::{DashboardSession, SessionUser};
use crate::store::{KeyValueStore, RecordStore};
use crate::CoreResult;

/// Draws menus and pages. Implemented by the outer surfaces.
pub trait Renderer {
    fn render_menu(&mut self, menu: &[MenuEntry], active: Option<&str>);
    fn render_page(&mut self, view: &PageViewModel);
}

pub struct Dashboard<'s, S> {
    store: &'s RecordStore<S>,
    session: DashboardSession,
}

impl<'s, S: KeyValueStore> Dashboard<'s, S> {
    /// Start a session: render the role's menu and select its first entry.
    ///
    /// A role with an empty menu gets an empty menu and no page.
    pub fn initialize(
        store: &'s RecordStore<S>,
        user: SessionUser,
        renderer: &mut dyn Renderer,
    ) -> CoreResult<Self> {
        let mut dashboard = Self {
            store,
            session: DashboardSession::new(user),
        };

        match dashboard.menu().first() {
            Some(landing) => {
                tracing::info!(
                    "{} signed in as {}, landing on {}",
                    dashboard.session.user().name(),
                    dashboard.session.user().role_label(),
                    landing.id
                );
                dashboard.select_page(landing.id, renderer)?;
            }
            None => {
                tracing::warn!(
                    "{} has no menu for role '{}'",
                    dashboard.session.user().name(),
                    dashboard.session.user().role_label()
                );
                renderer.render_menu(&[], None);
            }
        }

        Ok(dashboard)
    }

    pub fn menu(&self) -> &'static [MenuEntry] {
        self.session.user().profile().menu()
    }

    pub fn session(&self) -> &DashboardSession {
        &self.session
    }

    pub fn current_page(&self) -> Option<&str> {
        self.session.current_page()
    }

    /// Navigate to `page_id` and render it. Returns the composed view.
    pub fn select_page(
        &mut self,
        page_id: &str,
        renderer: &mut dyn Renderer,
    ) -> CoreResult<PageViewModel> {
        let data = DashboardData::load(self.store)?;
        let view = compose_page(self.session.user(), page_id, &data);

        self.session.set_current_page(page_id);
        renderer.render_menu(self.menu(), Some(page_id));
        renderer.render_page(&view);

        Ok(view)
    }
}

//! Session state.
//!
//! Session details come from an outside collaborator and are trusted as
//! given: nothing here verifies that the user really holds the role or owns
//! the patient id.

use crate::roles::{Role, RoleProfile, RoleProfileRegistry};
use serde::Serialize;

/// The signed-in user as supplied by the session collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    name: String,
    role_name: String,
    role: Option<Role>,
    patient_id: Option<String>,
}

impl SessionUser {
    /// Unrecognised role names are kept verbatim and resolve to no role.
    pub fn new(name: impl Into<String>, role_name: impl Into<String>, patient_id: Option<String>) -> Self {
        let role_name = role_name.into();
        let role = Role::parse(&role_name);
        if role.is_none() {
            tracing::warn!("session role '{}' is not recognised", role_name);
        }

        Self {
            name: name.into(),
            role_name,
            role,
            patient_id: patient_id
                .map(|id| id.trim().to_owned())
                .filter(|id| !id.is_empty()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Canonical role name, or the raw name when it did not parse.
    pub fn role_label(&self) -> &str {
        match self.role {
            Some(role) => role.as_str(),
            None => &self.role_name,
        }
    }

    pub fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    pub fn is(&self, role: Role) -> bool {
        self.role == Some(role)
    }

    pub fn profile(&self) -> &'static RoleProfile {
        let registry = RoleProfileRegistry::global();
        match self.role {
            Some(role) => registry.get_profile(role),
            None => registry.deny_all(),
        }
    }
}

/// Per-session navigation state.
#[derive(Clone, Debug)]
pub struct DashboardSession {
    user: SessionUser,
    current_page: Option<String>,
}

impl DashboardSession {
    pub fn new(user: SessionUser) -> Self {
        Self {
            user,
            current_page: None,
        }
    }

    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    pub fn current_page(&self) -> Option<&str> {
        self.current_page.as_deref()
    }

    pub(crate) fn set_current_page(&mut self, page_id: &str) {
        self.current_page = Some(page_id.to_owned());
    }
}

//! Mutation checks shared by the composer's affordances and record actions.
//!
//! A mutation is allowed when the role profile grants it for the category
//! and no page-level override takes it away again. The overrides are applied
//! after the profile check, never instead of it.

use crate::roles::{Action, Category, Role, RoleProfile};

pub fn mutation_allowed(profile: &RoleProfile, action: Action, category: Category) -> bool {
    if !profile.permits(action, category) {
        return false;
    }

    let is_admin = profile.role() == Some(Role::Admin);
    match (category, action) {
        (Category::Staff, Action::Insert) => is_admin,
        (Category::Announcements, _) => is_admin,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::RoleProfileRegistry;

    fn allowed(role: Role, action: Action, category: Category) -> bool {
        mutation_allowed(
            RoleProfileRegistry::global().get_profile(role),
            action,
            category,
        )
    }

    #[test]
    fn admin_keeps_staff_and_announcement_rights() {
        assert!(allowed(Role::Admin, Action::Insert, Category::Staff));
        assert!(allowed(Role::Admin, Action::Update, Category::Announcements));
        assert!(allowed(Role::Admin, Action::Delete, Category::Announcements));
    }

    #[test]
    fn non_admins_never_register_staff_or_touch_announcements() {
        for role in Role::ALL.into_iter().filter(|r| *r != Role::Admin) {
            assert!(!allowed(role, Action::Insert, Category::Staff));
            for action in [Action::Insert, Action::Update, Action::Delete] {
                assert!(!allowed(role, action, Category::Announcements));
            }
        }
    }

    #[test]
    fn profile_check_comes_first() {
        assert!(!allowed(Role::Physician, Action::Insert, Category::Vitals));
        assert!(allowed(Role::Nurse, Action::Insert, Category::Vitals));
        assert!(!mutation_allowed(
            RoleProfileRegistry::global().deny_all(),
            Action::Insert,
            Category::Patients
        ));
    }
}

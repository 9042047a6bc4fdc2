//! Role profiles.
//!
//! Every session carries one [`Role`] out of a closed set. The role decides
//! which [`Category`] of records the session may view and mutate, and which
//! menu it sees. Profiles live in a static table built once per process by
//! [`RoleProfileRegistry::global`] and are never mutated afterwards.
//!
//! Lookups fail closed: a role name that does not parse resolves to the
//! deny-all profile (nothing viewable, empty menu) instead of an error.
//!
//! These checks are advisory. They drive what the dashboard offers; nothing
//! below the dashboard re-checks them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

// ============================================================================
// ROLES, CATEGORIES, ACTIONS
// ============================================================================

/// Job function assigned to a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Physician,
    Nurse,
    Pharmacist,
    LabTech,
    ImagingTech,
    Patient,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Admin,
        Role::Physician,
        Role::Nurse,
        Role::Pharmacist,
        Role::LabTech,
        Role::ImagingTech,
        Role::Patient,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Physician => "Physician",
            Role::Nurse => "Nurse",
            Role::Pharmacist => "Pharmacist",
            Role::LabTech => "LabTech",
            Role::ImagingTech => "ImagingTech",
            Role::Patient => "Patient",
        }
    }

    /// Parse a role name as supplied by the session collaborator.
    ///
    /// Matching ignores case, spaces, `-` and `_`, so "Lab Tech", "lab-tech"
    /// and "LABTECH" all resolve to [`Role::LabTech`].
    pub fn parse(name: &str) -> Option<Role> {
        let normalised: String = name
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        Role::ALL
            .into_iter()
            .find(|role| role.as_str().to_ascii_lowercase() == normalised)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of permission granularity.
///
/// Declaration order is significant: it is the order in which viewable
/// categories are reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Patients,
    Staff,
    Prescriptions,
    LabResults,
    Imaging,
    Vitals,
    Dispensing,
    Inventory,
    QualityControl,
    Orders,
    Announcements,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Patients,
        Category::Staff,
        Category::Prescriptions,
        Category::LabResults,
        Category::Imaging,
        Category::Vitals,
        Category::Dispensing,
        Category::Inventory,
        Category::QualityControl,
        Category::Orders,
        Category::Announcements,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Patients => "patients",
            Category::Staff => "staff",
            Category::Prescriptions => "prescriptions",
            Category::LabResults => "lab_results",
            Category::Imaging => "imaging",
            Category::Vitals => "vitals",
            Category::Dispensing => "dispensing",
            Category::Inventory => "inventory",
            Category::QualityControl => "quality_control",
            Category::Orders => "orders",
            Category::Announcements => "announcements",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutation kinds gated by a profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Action::Insert => "insert",
            Action::Update => "update",
            Action::Delete => "delete",
        })
    }
}

// ============================================================================
// PROFILES
// ============================================================================

/// One sidebar entry. The first entry of a menu is the landing page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub icon_ref: &'static str,
}

const OVERVIEW: MenuEntry = MenuEntry {
    id: "overview",
    label: "Dashboard",
    icon_ref: "home",
};
const MY_RECORDS: MenuEntry = MenuEntry {
    id: "my-records",
    label: "My Records",
    icon_ref: "file-medical",
};
const ALL_PATIENTS: MenuEntry = MenuEntry {
    id: "all-patients",
    label: "Patients",
    icon_ref: "users",
};
const MY_PROFILE: MenuEntry = MenuEntry {
    id: "all-patients",
    label: "My Profile",
    icon_ref: "user",
};
const REGISTER_STAFF: MenuEntry = MenuEntry {
    id: "register-staff",
    label: "Staff Registry",
    icon_ref: "user-plus",
};
const PATIENT_SUMMARY: MenuEntry = MenuEntry {
    id: "patient-summary",
    label: "Patient Summary",
    icon_ref: "layout",
};
const PRESCRIPTIONS: MenuEntry = MenuEntry {
    id: "prescriptions",
    label: "Prescriptions",
    icon_ref: "pill",
};
const LAB_RESULTS: MenuEntry = MenuEntry {
    id: "lab-results",
    label: "Lab Results",
    icon_ref: "flask",
};
const IMAGING: MenuEntry = MenuEntry {
    id: "imaging",
    label: "Imaging",
    icon_ref: "scan",
};
const VITALS: MenuEntry = MenuEntry {
    id: "vitals",
    label: "Vital Signs",
    icon_ref: "heart-pulse",
};
const DISPENSING: MenuEntry = MenuEntry {
    id: "dispensing",
    label: "Dispensing",
    icon_ref: "prescription-bottle",
};
const INVENTORY: MenuEntry = MenuEntry {
    id: "inventory",
    label: "Inventory",
    icon_ref: "package",
};
const QUALITY_CONTROL: MenuEntry = MenuEntry {
    id: "quality-control",
    label: "Quality Control",
    icon_ref: "clipboard-check",
};
const MED_ORDERS: MenuEntry = MenuEntry {
    id: "med-orders",
    label: "Medication Orders",
    icon_ref: "truck",
};
const ANNOUNCEMENTS: MenuEntry = MenuEntry {
    id: "announcements",
    label: "Announcements",
    icon_ref: "megaphone",
};

/// Capability profile of a role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoleProfile {
    role: Option<Role>,
    viewable: BTreeSet<Category>,
    insertable: BTreeSet<Category>,
    updatable: BTreeSet<Category>,
    deletable: BTreeSet<Category>,
    denied_actions: Vec<&'static str>,
    menu: Vec<MenuEntry>,
}

impl RoleProfile {
    /// Profile granting nothing. Used for unrecognised role names.
    pub fn deny_all() -> Self {
        Self {
            role: None,
            viewable: BTreeSet::new(),
            insertable: BTreeSet::new(),
            updatable: BTreeSet::new(),
            deletable: BTreeSet::new(),
            denied_actions: Vec::new(),
            menu: Vec::new(),
        }
    }

    /// The role this profile belongs to; `None` for the deny-all profile.
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn viewable(&self) -> &BTreeSet<Category> {
        &self.viewable
    }

    pub fn insertable(&self) -> &BTreeSet<Category> {
        &self.insertable
    }

    pub fn updatable(&self) -> &BTreeSet<Category> {
        &self.updatable
    }

    pub fn deletable(&self) -> &BTreeSet<Category> {
        &self.deletable
    }

    /// Human-readable denial notes. Informational only.
    pub fn denied_actions(&self) -> &[&'static str] {
        &self.denied_actions
    }

    pub fn menu(&self) -> &[MenuEntry] {
        &self.menu
    }

    pub fn can_view(&self, category: Category) -> bool {
        self.viewable.contains(&category)
    }

    pub fn permits(&self, action: Action, category: Category) -> bool {
        match action {
            Action::Insert => self.insertable.contains(&category),
            Action::Update => self.updatable.contains(&category),
            Action::Delete => self.deletable.contains(&category),
        }
    }

    /// The first `n` viewable categories in declaration order.
    pub fn first_viewable(&self, n: usize) -> Vec<Category> {
        self.viewable.iter().copied().take(n).collect()
    }
}

struct ProfileSpec {
    viewable: &'static [Category],
    insertable: &'static [Category],
    updatable: &'static [Category],
    deletable: &'static [Category],
    denied_actions: &'static [&'static str],
    menu: &'static [MenuEntry],
}

impl ProfileSpec {
    fn build(&self, role: Role) -> RoleProfile {
        RoleProfile {
            role: Some(role),
            viewable: self.viewable.iter().copied().collect(),
            insertable: self.insertable.iter().copied().collect(),
            updatable: self.updatable.iter().copied().collect(),
            deletable: self.deletable.iter().copied().collect(),
            denied_actions: self.denied_actions.to_vec(),
            menu: self.menu.to_vec(),
        }
    }
}

fn profile_spec(role: Role) -> ProfileSpec {
    use Category::*;

    match role {
        Role::Admin => ProfileSpec {
            viewable: &Category::ALL,
            insertable: &[Patients, Staff, Announcements, Inventory],
            updatable: &[Patients, Staff, Announcements, Inventory],
            deletable: &[Patients, Staff, Announcements],
            denied_actions: &[
                "Cannot prescribe medication",
                "Cannot enter lab or imaging results",
            ],
            menu: &[OVERVIEW, ALL_PATIENTS, REGISTER_STAFF, ANNOUNCEMENTS, INVENTORY],
        },
        Role::Physician => ProfileSpec {
            viewable: &[Patients, Prescriptions, LabResults, Imaging, Vitals, Announcements],
            insertable: &[Prescriptions],
            updatable: &[Prescriptions],
            deletable: &[],
            denied_actions: &[
                "Cannot register staff",
                "Cannot modify lab results",
                "Cannot dispense medication",
            ],
            menu: &[
                OVERVIEW,
                ALL_PATIENTS,
                PATIENT_SUMMARY,
                PRESCRIPTIONS,
                LAB_RESULTS,
                IMAGING,
                VITALS,
                ANNOUNCEMENTS,
            ],
        },
        Role::Nurse => ProfileSpec {
            viewable: &[Patients, Prescriptions, Vitals, Announcements],
            insertable: &[Vitals],
            updatable: &[Vitals],
            deletable: &[],
            denied_actions: &[
                "Cannot prescribe medication",
                "Cannot view imaging results",
            ],
            menu: &[OVERVIEW, ALL_PATIENTS, VITALS, PRESCRIPTIONS, ANNOUNCEMENTS],
        },
        Role::Pharmacist => ProfileSpec {
            viewable: &[
                Patients,
                Prescriptions,
                Dispensing,
                Inventory,
                Orders,
                Announcements,
            ],
            insertable: &[Dispensing, Inventory, Orders],
            updatable: &[Dispensing, Inventory, Orders],
            deletable: &[Orders],
            denied_actions: &[
                "Cannot prescribe medication",
                "Cannot edit patient records",
            ],
            menu: &[
                OVERVIEW,
                PRESCRIPTIONS,
                DISPENSING,
                INVENTORY,
                MED_ORDERS,
                ANNOUNCEMENTS,
            ],
        },
        Role::LabTech => ProfileSpec {
            viewable: &[Patients, LabResults, QualityControl, Announcements],
            insertable: &[LabResults, QualityControl],
            updatable: &[LabResults, QualityControl],
            deletable: &[QualityControl],
            denied_actions: &[
                "Cannot view prescriptions",
                "Cannot edit patient records",
            ],
            menu: &[OVERVIEW, LAB_RESULTS, QUALITY_CONTROL, ANNOUNCEMENTS],
        },
        Role::ImagingTech => ProfileSpec {
            viewable: &[Patients, Imaging, Announcements],
            insertable: &[Imaging],
            updatable: &[Imaging],
            deletable: &[],
            denied_actions: &[
                "Cannot view lab results",
                "Cannot edit patient records",
            ],
            menu: &[OVERVIEW, IMAGING, ANNOUNCEMENTS],
        },
        Role::Patient => ProfileSpec {
            viewable: &[Patients, Prescriptions, LabResults, Imaging, Vitals, Announcements],
            insertable: &[],
            updatable: &[],
            deletable: &[],
            denied_actions: &[
                "Can only view own records",
                "Cannot modify any record",
            ],
            menu: &[
                MY_RECORDS,
                MY_PROFILE,
                PRESCRIPTIONS,
                LAB_RESULTS,
                IMAGING,
                ANNOUNCEMENTS,
            ],
        },
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

static REGISTRY: LazyLock<RoleProfileRegistry> = LazyLock::new(RoleProfileRegistry::build);

/// Process-wide, read-only table of role profiles.
#[derive(Debug)]
pub struct RoleProfileRegistry {
    profiles: HashMap<Role, RoleProfile>,
    deny_all: RoleProfile,
}

impl RoleProfileRegistry {
    /// The registry shared by the whole process, built on first use.
    pub fn global() -> &'static RoleProfileRegistry {
        &REGISTRY
    }

    fn build() -> Self {
        let profiles = Role::ALL
            .into_iter()
            .map(|role| (role, profile_spec(role).build(role)))
            .collect();

        Self {
            profiles,
            deny_all: RoleProfile::deny_all(),
        }
    }

    pub fn get_profile(&self, role: Role) -> &RoleProfile {
        self.profiles.get(&role).unwrap_or(&self.deny_all)
    }

    /// Look up a profile by the role name a session supplied.
    ///
    /// Unrecognised names resolve to the deny-all profile.
    pub fn get_profile_by_name(&self, name: &str) -> &RoleProfile {
        match Role::parse(name) {
            Some(role) => self.get_profile(role),
            None => {
                tracing::warn!("unrecognised role '{}', using deny-all profile", name);
                &self.deny_all
            }
        }
    }

    pub fn deny_all(&self) -> &RoleProfile {
        &self.deny_all
    }

    pub fn is_category_viewable(&self, role: Role, category: Category) -> bool {
        self.get_profile(role).can_view(category)
    }

    pub fn is_action_permitted(&self, role: Role, action: Action, category: Category) -> bool {
        self.get_profile(role).permits(action, category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> &'static RoleProfileRegistry {
        RoleProfileRegistry::global()
    }

    #[test]
    fn every_role_has_a_non_empty_menu() {
        for role in Role::ALL {
            assert!(
                !registry().get_profile(role).menu().is_empty(),
                "{role} has an empty menu"
            );
        }
    }

    #[test]
    fn every_role_can_view_patients_and_announcements() {
        for role in Role::ALL {
            assert!(registry().is_category_viewable(role, Category::Patients));
            assert!(registry().is_category_viewable(role, Category::Announcements));
        }
    }

    #[test]
    fn mutation_sets_are_subsets_of_viewable() {
        for role in Role::ALL {
            let profile = registry().get_profile(role);
            for set in [profile.insertable(), profile.updatable(), profile.deletable()] {
                assert!(set.is_subset(profile.viewable()), "{role} mutates unviewable data");
            }
        }
    }

    #[test]
    fn unknown_role_name_fails_closed() {
        let profile = registry().get_profile_by_name("Janitor");

        assert_eq!(profile.role(), None);
        assert!(profile.viewable().is_empty());
        assert!(profile.insertable().is_empty());
        assert!(profile.updatable().is_empty());
        assert!(profile.deletable().is_empty());
        assert!(profile.menu().is_empty());
    }

    #[test]
    fn role_names_parse_loosely() {
        assert_eq!(Role::parse("Lab Tech"), Some(Role::LabTech));
        assert_eq!(Role::parse("imaging-tech"), Some(Role::ImagingTech));
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse("patient"), Some(Role::Patient));
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::parse("Surgeon"), None);
    }

    #[test]
    fn action_lookups_follow_the_table() {
        let r = registry();
        assert!(r.is_action_permitted(Role::Nurse, Action::Insert, Category::Vitals));
        assert!(!r.is_action_permitted(Role::Nurse, Action::Delete, Category::Vitals));
        assert!(r.is_action_permitted(Role::Admin, Action::Delete, Category::Patients));
        assert!(!r.is_action_permitted(Role::Physician, Action::Update, Category::Patients));
        assert!(!r.is_action_permitted(Role::Patient, Action::Insert, Category::Prescriptions));
    }

    #[test]
    fn first_viewable_uses_declaration_order() {
        let profile = registry().get_profile(Role::Physician);
        assert_eq!(
            profile.first_viewable(3),
            vec![Category::Patients, Category::Prescriptions, Category::LabResults]
        );
    }

    #[test]
    fn patient_lands_on_own_records() {
        let menu = registry().get_profile(Role::Patient).menu();
        assert_eq!(menu[0].id, "my-records");
    }
}

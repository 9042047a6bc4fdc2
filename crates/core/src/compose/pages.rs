use crate::roles::Category;
use serde::Serialize;

/// A page the composer knows how to build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageId {
    Overview,
    AllPatients,
    RegisterStaff,
    PatientSummary,
    Prescriptions,
    LabResults,
    Imaging,
    Vitals,
    Dispensing,
    Inventory,
    QualityControl,
    MedOrders,
    Announcements,
    MyRecords,
}

impl PageId {
    pub const ALL: [PageId; 14] = [
        PageId::Overview,
        PageId::AllPatients,
        PageId::RegisterStaff,
        PageId::PatientSummary,
        PageId::Prescriptions,
        PageId::LabResults,
        PageId::Imaging,
        PageId::Vitals,
        PageId::Dispensing,
        PageId::Inventory,
        PageId::QualityControl,
        PageId::MedOrders,
        PageId::Announcements,
        PageId::MyRecords,
    ];

    pub fn parse(raw: &str) -> Option<PageId> {
        PageId::ALL.into_iter().find(|p| p.as_str() == raw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PageId::Overview => "overview",
            PageId::AllPatients => "all-patients",
            PageId::RegisterStaff => "register-staff",
            PageId::PatientSummary => "patient-summary",
            PageId::Prescriptions => "prescriptions",
            PageId::LabResults => "lab-results",
            PageId::Imaging => "imaging",
            PageId::Vitals => "vitals",
            PageId::Dispensing => "dispensing",
            PageId::Inventory => "inventory",
            PageId::QualityControl => "quality-control",
            PageId::MedOrders => "med-orders",
            PageId::Announcements => "announcements",
            PageId::MyRecords => "my-records",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PageId::Overview => "Dashboard Overview",
            PageId::AllPatients => "Patients",
            PageId::RegisterStaff => "Staff Registry",
            PageId::PatientSummary => "Patient Summary",
            PageId::Prescriptions => "Prescriptions",
            PageId::LabResults => "Lab Results",
            PageId::Imaging => "Imaging Results",
            PageId::Vitals => "Vital Signs",
            PageId::Dispensing => "Dispensing",
            PageId::Inventory => "Unavailable Medications",
            PageId::QualityControl => "Quality Control",
            PageId::MedOrders => "Medication Orders",
            PageId::Announcements => "Announcements",
            PageId::MyRecords => "My Records",
        }
    }

    /// Category whose visibility gates the page. The overview has none.
    pub fn category(self) -> Option<Category> {
        match self {
            PageId::Overview => None,
            PageId::AllPatients | PageId::PatientSummary | PageId::MyRecords => {
                Some(Category::Patients)
            }
            PageId::RegisterStaff => Some(Category::Staff),
            PageId::Prescriptions => Some(Category::Prescriptions),
            PageId::LabResults => Some(Category::LabResults),
            PageId::Imaging => Some(Category::Imaging),
            PageId::Vitals => Some(Category::Vitals),
            PageId::Dispensing => Some(Category::Dispensing),
            PageId::Inventory => Some(Category::Inventory),
            PageId::QualityControl => Some(Category::QualityControl),
            PageId::MedOrders => Some(Category::Orders),
            PageId::Announcements => Some(Category::Announcements),
        }
    }

    /// Pages that summarise without offering any mutation.
    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            PageId::Overview | PageId::PatientSummary | PageId::MyRecords
        )
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

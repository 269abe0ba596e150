use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Dutch health insurers a request can be addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Insurer {
    Vgz,
    Cz,
    ZilverenKruis,
}

impl Insurer {
    pub fn display_name(&self) -> &'static str {
        match self {
            Insurer::Vgz => "VGZ",
            Insurer::Cz => "CZ",
            Insurer::ZilverenKruis => "Zilveren Kruis",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Mri,
    Physiotherapy,
    SpecialistReferral,
    Medication,
    Surgery,
}

impl RequestType {
    pub fn display_name(&self) -> &'static str {
        match self {
            RequestType::Mri => "MRI",
            RequestType::Physiotherapy => "Physiotherapy",
            RequestType::SpecialistReferral => "Specialist referral",
            RequestType::Medication => "Medication",
            RequestType::Surgery => "Surgery",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    pub fn display_name(&self) -> &'static str {
        match self {
            Urgency::High => "High",
            Urgency::Medium => "Medium",
            Urgency::Low => "Low",
        }
    }
}

/// Everything the GP enters for one prior authorization request.
///
/// `phone` and `email` are optional; every other string field must be
/// non-blank before the request may leave the service. Absent required
/// strings deserialize as empty so they surface through
/// `missing_required_fields` instead of a parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormInput {
    #[serde(default)]
    pub full_name: String,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub identifier: String,
    pub insurer: Insurer,
    pub request_type: RequestType,
    #[serde(default)]
    pub diagnostic_code: String,
    pub urgency: Urgency,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[cfg(test)]
impl FormInput {
    /// The reference patient used across module tests.
    pub fn sample() -> Self {
        FormInput {
            full_name: "Jan de Vries".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
            identifier: "VGZ12345678".to_string(),
            insurer: Insurer::Vgz,
            request_type: RequestType::Mri,
            diagnostic_code: "L84".to_string(),
            urgency: Urgency::High,
            note: "chronic low back pain".to_string(),
            phone: None,
            email: None,
        }
    }
}

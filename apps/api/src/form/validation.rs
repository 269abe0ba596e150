//! Field format checks for the prior authorization form.
//!
//! Format mismatches are advisory: they come back as `ValidationWarning`s and
//! never stop a submission. Only empty required fields block.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::form::{FormInput, Insurer};

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+31|0)[0-9]{9,11}$").unwrap());

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

static VGZ_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^VGZ[0-9]{8}$").unwrap());
static CZ_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^CZ[0-9]{8}$").unwrap());
static ZK_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ZK[0-9]{8}$").unwrap());

/// What a value is checked as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Phone,
    Email,
    Identifier(Insurer),
}

impl FieldKind {
    fn field_name(&self) -> &'static str {
        match self {
            FieldKind::Phone => "phone",
            FieldKind::Email => "email",
            FieldKind::Identifier(_) => "identifier",
        }
    }
}

/// A non-blocking format complaint about one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

fn identifier_pattern(insurer: Insurer) -> &'static Regex {
    match insurer {
        Insurer::Vgz => &*VGZ_PATTERN,
        Insurer::Cz => &*CZ_PATTERN,
        Insurer::ZilverenKruis => &*ZK_PATTERN,
    }
}

fn identifier_example(insurer: Insurer) -> &'static str {
    match insurer {
        Insurer::Vgz => "VGZ12345678",
        Insurer::Cz => "CZ12345678",
        Insurer::ZilverenKruis => "ZK12345678",
    }
}

/// Pure format predicate.
pub fn validate(kind: FieldKind, value: &str) -> bool {
    match kind {
        FieldKind::Phone => PHONE_PATTERN.is_match(value),
        FieldKind::Email => EMAIL_PATTERN.is_match(value),
        FieldKind::Identifier(insurer) => identifier_pattern(insurer).is_match(value),
    }
}

fn check(kind: FieldKind, value: &str) -> Option<ValidationWarning> {
    if validate(kind, value) {
        return None;
    }

    let message = match kind {
        FieldKind::Phone => {
            format!("'{value}' is not a Dutch phone number (expected +31 or 0 followed by 9-11 digits)")
        }
        FieldKind::Email => format!("'{value}' does not look like an e-mail address"),
        FieldKind::Identifier(insurer) => format!(
            "'{value}' does not match the {} identifier format (e.g. {})",
            insurer.display_name(),
            identifier_example(insurer)
        ),
    };

    Some(ValidationWarning {
        field: kind.field_name().to_string(),
        message,
    })
}

/// Runs every advisory check on the form. Optional contact fields are only
/// checked when present and non-blank.
pub fn collect_warnings(input: &FormInput) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if let Some(w) = check(FieldKind::Identifier(input.insurer), input.identifier.trim()) {
        warnings.push(w);
    }

    let optional = [
        (FieldKind::Phone, input.phone.as_deref()),
        (FieldKind::Email, input.email.as_deref()),
    ];
    for (kind, value) in optional {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            continue;
        };
        if let Some(w) = check(kind, value) {
            warnings.push(w);
        }
    }

    warnings
}

/// Names of required fields that are empty or whitespace-only, in form order.
pub fn missing_required_fields(input: &FormInput) -> Vec<&'static str> {
    [
        ("full_name", input.full_name.as_str()),
        ("identifier", input.identifier.as_str()),
        ("diagnostic_code", input.diagnostic_code.as_str()),
        ("note", input.note.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mobile_number_passes() {
        assert!(validate(FieldKind::Phone, "0612345678"));
    }

    #[test]
    fn test_international_prefix_passes() {
        assert!(validate(FieldKind::Phone, "+31612345678"));
    }

    #[test]
    fn test_short_number_fails() {
        assert!(!validate(FieldKind::Phone, "12345"));
    }

    #[test]
    fn test_phone_with_spaces_fails() {
        assert!(!validate(FieldKind::Phone, "06 1234 5678"));
    }

    #[test]
    fn test_identifier_per_insurer() {
        assert!(validate(FieldKind::Identifier(Insurer::Vgz), "VGZ12345678"));
        assert!(validate(FieldKind::Identifier(Insurer::Cz), "CZ87654321"));
        assert!(validate(
            FieldKind::Identifier(Insurer::ZilverenKruis),
            "ZK00000001"
        ));
    }

    #[test]
    fn test_identifier_of_other_insurer_fails() {
        assert!(!validate(FieldKind::Identifier(Insurer::Cz), "VGZ12345678"));
        assert!(!validate(FieldKind::Identifier(Insurer::Vgz), "VGZ1234"));
    }

    #[test]
    fn test_email() {
        assert!(validate(FieldKind::Email, "huisarts@praktijk.nl"));
        assert!(!validate(FieldKind::Email, "huisarts.praktijk.nl"));
    }

    #[test]
    fn test_sample_form_has_no_warnings() {
        assert!(collect_warnings(&FormInput::sample()).is_empty());
    }

    #[test]
    fn test_bad_phone_warns_but_does_not_mark_field_missing() {
        let mut input = FormInput::sample();
        input.phone = Some("12345".to_string());

        let warnings = collect_warnings(&input);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "phone");
        assert!(missing_required_fields(&input).is_empty());
    }

    #[test]
    fn test_blank_optional_fields_are_not_checked() {
        let mut input = FormInput::sample();
        input.phone = Some("   ".to_string());
        input.email = Some(String::new());
        assert!(collect_warnings(&input).is_empty());
    }

    #[test]
    fn test_identifier_mismatch_warns() {
        let mut input = FormInput::sample();
        input.insurer = Insurer::ZilverenKruis;
        let warnings = collect_warnings(&input);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("Zilveren Kruis"));
    }

    #[test]
    fn test_missing_required_fields_lists_blank_fields_in_order() {
        let mut input = FormInput::sample();
        input.full_name = String::new();
        input.note = "  \n ".to_string();
        assert_eq!(missing_required_fields(&input), vec!["full_name", "note"]);
    }

    #[test]
    fn test_complete_form_has_no_missing_fields() {
        assert!(missing_required_fields(&FormInput::sample()).is_empty());
    }
}

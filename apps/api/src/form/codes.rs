//! ICPC diagnostic codes offered in the form's code picker.

use serde::Serialize;

pub const UNKNOWN_CODE_LABEL: &str = "Unknown code";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiagnosticCode {
    pub code: &'static str,
    pub label: &'static str,
}

const fn entry(code: &'static str, label: &'static str) -> DiagnosticCode {
    DiagnosticCode { code, label }
}

#[rustfmt::skip]
static CODES: &[DiagnosticCode] = &[
    entry("D12", "Constipation"),
    entry("D87", "Stomach function disorder"),
    entry("F92", "Cataract"),
    entry("H02", "Hearing complaint"),
    entry("K77", "Heart failure"),
    entry("K78", "Atrial fibrillation/flutter"),
    entry("K86", "Hypertension without organ damage"),
    entry("L15", "Knee symptom/complaint"),
    entry("L84", "Back syndrome without radiating pain"),
    entry("L86", "Back syndrome with radiating pain"),
    entry("L89", "Osteoarthrosis of hip"),
    entry("L90", "Osteoarthrosis of knee"),
    entry("L92", "Shoulder syndrome"),
    entry("L93", "Tennis elbow"),
    entry("L96", "Acute internal damage knee"),
    entry("N02", "Tension headache"),
    entry("N89", "Migraine"),
    entry("N94", "Peripheral neuritis/neuropathy"),
    entry("P74", "Anxiety disorder"),
    entry("P76", "Depressive disorder"),
    entry("R95", "Chronic obstructive pulmonary disease"),
    entry("R96", "Asthma"),
    entry("S87", "Atopic dermatitis/eczema"),
    entry("S91", "Psoriasis"),
    entry("T90", "Diabetes mellitus type 2"),
];

/// Codes whose label or code contains `query`, case-insensitively, in table
/// order. A blank query returns the whole table.
pub fn search(query: &str) -> Vec<DiagnosticCode> {
    let needle = query.trim().to_lowercase();
    CODES
        .iter()
        .filter(|c| {
            needle.is_empty()
                || c.label.to_lowercase().contains(&needle)
                || c.code.to_lowercase().contains(&needle)
        })
        .copied()
        .collect()
}

/// Label for `code`, or [`UNKNOWN_CODE_LABEL`].
pub fn label(code: &str) -> &'static str {
    let code = code.trim();
    CODES
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code))
        .map(|c| c.label)
        .unwrap_or(UNKNOWN_CODE_LABEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_known_code() {
        assert_eq!(label("L84"), "Back syndrome without radiating pain");
    }

    #[test]
    fn test_label_is_case_insensitive() {
        assert_eq!(label(" l84 "), label("L84"));
    }

    #[test]
    fn test_label_unknown_code() {
        assert_eq!(label("Z99"), UNKNOWN_CODE_LABEL);
    }

    #[test]
    fn test_search_matches_label_substring_ignoring_case() {
        let hits = search("BACK");
        let codes: Vec<_> = hits.iter().map(|c| c.code).collect();
        assert_eq!(codes, vec!["L84", "L86"]);
    }

    #[test]
    fn test_search_matches_code() {
        let hits = search("n89");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].label, "Migraine");
    }

    #[test]
    fn test_search_no_match() {
        assert!(search("fracture of the moon").is_empty());
    }

    #[test]
    fn test_blank_query_returns_everything() {
        assert_eq!(search("  ").len(), CODES.len());
    }

    #[test]
    fn test_codes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        assert!(CODES.iter().all(|c| seen.insert(c.code)));
    }
}

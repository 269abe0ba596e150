//! Submission Ledger: append-only, in-memory history of one session.
//!
//! There is no update or delete. Ids are unique per ledger; a duplicate
//! append is rejected rather than silently replacing the earlier record.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::submission::{LedgerRow, SubmissionRecord};

/// How much generated text a record keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Maximum number of characters (not bytes) kept in `truncated_document`.
    pub snippet_chars: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self { snippet_chars: 500 }
    }
}

impl RetentionPolicy {
    /// First `snippet_chars` characters of `text`.
    pub fn snippet(&self, text: &str) -> String {
        text.chars().take(self.snippet_chars).collect()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Submission {0} is already in the ledger")]
    DuplicateId(Uuid),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerOrder {
    #[default]
    Insertion,
    Oldest,
    Newest,
}

impl LedgerOrder {
    /// Reorders `records` (assumed in insertion order) in place. Timestamp
    /// sorts are stable, so ties keep insertion order.
    pub fn apply(self, records: &mut [&SubmissionRecord]) {
        match self {
            LedgerOrder::Insertion => {}
            LedgerOrder::Oldest => records.sort_by_key(|r| r.timestamp),
            LedgerOrder::Newest => records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        }
    }
}

#[derive(Debug, Default)]
pub struct SubmissionLedger {
    records: Vec<SubmissionRecord>,
    ids: HashSet<Uuid>,
}

impl SubmissionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: SubmissionRecord) -> Result<(), LedgerError> {
        if !self.ids.insert(record.id) {
            return Err(LedgerError::DuplicateId(record.id));
        }
        self.records.push(record);
        Ok(())
    }

    /// Records whose name or identifier contains `needle`, ignoring case,
    /// in insertion order. A blank needle matches everything.
    pub fn query(&self, needle: &str) -> Vec<&SubmissionRecord> {
        let needle = needle.trim().to_lowercase();
        self.all()
            .iter()
            .filter(|r| {
                needle.is_empty()
                    || r.form.full_name.to_lowercase().contains(&needle)
                    || r.form.identifier.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Every record in insertion order.
    pub fn all(&self) -> &[SubmissionRecord] {
        &self.records
    }

    pub fn get(&self, id: Uuid) -> Option<&SubmissionRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Tabular export for the history view.
    pub fn rows<'a>(records: impl IntoIterator<Item = &'a SubmissionRecord>) -> Vec<LedgerRow> {
        records.into_iter().map(LedgerRow::from).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::models::form::FormInput;

    fn record(name: &str, identifier: &str, ts: DateTime<Utc>) -> SubmissionRecord {
        let mut form = FormInput::sample();
        form.full_name = name.to_string();
        form.identifier = identifier.to_string();
        SubmissionRecord {
            id: Uuid::new_v4(),
            timestamp: ts,
            form,
            truncated_document: "=== PATIENT ===".to_string(),
            signed: false,
        }
    }

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_append_then_query_by_exact_name_returns_record_once() {
        let mut ledger = SubmissionLedger::new();
        let r = record("Jan de Vries", "VGZ12345678", ts(9));
        let id = r.id;
        ledger.append(r).unwrap();
        ledger.append(record("Anna Bakker", "CZ12345678", ts(10))).unwrap();

        let hits = ledger.query("Jan de Vries");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, id);
    }

    #[test]
    fn test_query_is_case_insensitive_on_name_and_identifier() {
        let mut ledger = SubmissionLedger::new();
        ledger.append(record("Jan de Vries", "VGZ12345678", ts(9))).unwrap();
        ledger.append(record("Anna Bakker", "CZ87654321", ts(10))).unwrap();

        assert_eq!(ledger.query("DE VRIES").len(), 1);
        assert_eq!(ledger.query("cz8765").len(), 1);
        assert!(ledger.query("Jansen").is_empty());
        assert_eq!(ledger.query("").len(), 2);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let mut ledger = SubmissionLedger::new();
        let r = record("Jan de Vries", "VGZ12345678", ts(9));
        let dup = r.clone();
        ledger.append(r).unwrap();

        assert_eq!(ledger.append(dup.clone()), Err(LedgerError::DuplicateId(dup.id)));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_all_keeps_insertion_order() {
        let mut ledger = SubmissionLedger::new();
        ledger.append(record("B", "1", ts(12))).unwrap();
        ledger.append(record("A", "2", ts(8))).unwrap();

        let names: Vec<_> = ledger.all().iter().map(|r| r.form.full_name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_order_by_timestamp() {
        let mut ledger = SubmissionLedger::new();
        ledger.append(record("mid", "1", ts(10))).unwrap();
        ledger.append(record("late", "2", ts(12))).unwrap();
        ledger.append(record("early", "3", ts(8))).unwrap();

        let names = |order: LedgerOrder| -> Vec<String> {
            let mut records = ledger.query("");
            order.apply(&mut records);
            records.iter().map(|r| r.form.full_name.clone()).collect()
        };
        assert_eq!(names(LedgerOrder::Oldest), vec!["early", "mid", "late"]);
        assert_eq!(names(LedgerOrder::Newest), vec!["late", "mid", "early"]);
        assert_eq!(names(LedgerOrder::Insertion), vec!["mid", "late", "early"]);
    }

    #[test]
    fn test_query_then_order() {
        let mut ledger = SubmissionLedger::new();
        ledger.append(record("Jan de Vries", "VGZ00000001", ts(9))).unwrap();
        ledger.append(record("Anna Bakker", "CZ00000002", ts(10))).unwrap();
        ledger.append(record("Jan Jansen", "ZK00000003", ts(11))).unwrap();

        let mut hits = ledger.query("jan");
        LedgerOrder::Newest.apply(&mut hits);
        let names: Vec<_> = hits.iter().map(|r| r.form.full_name.as_str()).collect();
        assert_eq!(names, vec!["Jan Jansen", "Jan de Vries"]);
    }

    #[test]
    fn test_rows_projection() {
        let mut ledger = SubmissionLedger::new();
        let r = record("Jan de Vries", "VGZ12345678", ts(9));
        let id = r.id;
        ledger.append(r).unwrap();

        let rows = SubmissionLedger::rows(ledger.all());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].name, "Jan de Vries");
        assert_eq!(rows[0].timestamp, ts(9));
    }

    #[test]
    fn test_get_by_id() {
        let mut ledger = SubmissionLedger::new();
        let r = record("Jan de Vries", "VGZ12345678", ts(9));
        let id = r.id;
        ledger.append(r).unwrap();
        assert!(ledger.get(id).is_some());
        assert!(ledger.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_snippet_counts_characters_not_bytes() {
        let policy = RetentionPolicy { snippet_chars: 3 };
        assert_eq!(policy.snippet("ëëëë"), "ëëë");
        assert_eq!(policy.snippet("ab"), "ab");
    }

    #[test]
    fn test_default_retention_is_500_chars() {
        let text = "x".repeat(800);
        assert_eq!(RetentionPolicy::default().snippet(&text).len(), 500);
    }
}

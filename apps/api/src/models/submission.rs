use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::form::{FormInput, Insurer, RequestType, Urgency};

/// One successful generation, as kept in a session ledger.
///
/// Records are created only after both the completion call and the document
/// build succeeded. They are never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub form: FormInput,
    /// Leading slice of the generated text, cut by the ledger's retention policy.
    pub truncated_document: String,
    pub signed: bool,
}

/// Tabular projection of a record for the history view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRow {
    pub id: Uuid,
    pub name: String,
    pub insurer: Insurer,
    pub request_type: RequestType,
    pub urgency: Urgency,
    pub timestamp: DateTime<Utc>,
    pub signed: bool,
}

impl From<&SubmissionRecord> for LedgerRow {
    fn from(record: &SubmissionRecord) -> Self {
        LedgerRow {
            id: record.id,
            name: record.form.full_name.clone(),
            insurer: record.form.insurer,
            request_type: record.form.request_type,
            urgency: record.form.urgency,
            timestamp: record.timestamp,
            signed: record.signed,
        }
    }
}

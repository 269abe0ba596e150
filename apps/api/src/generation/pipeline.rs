//! Submission pipeline: orchestrates one prior authorization request.
//!
//! Flow: required-field check → advisory warnings → render → complete →
//!       build PDF → append to session ledger → keep PDF for download.
//!
//! A failure at any step returns before the ledger is touched, so a failed
//! generation leaves no trace in the session history.

use std::time::Instant;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::document::{self, DocumentBuildError, PageStyle};
use crate::errors::AppError;
use crate::form::validation::{collect_warnings, missing_required_fields, ValidationWarning};
use crate::generation::renderer::{render, render_note_only};
use crate::llm_client::CompletionClient;
use crate::models::form::FormInput;
use crate::models::submission::SubmissionRecord;
use crate::session::Session;
use crate::state::PipelineSettings;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Request body for a submission: the form plus the GP's sign-off flag.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    #[serde(flatten)]
    pub form: FormInput,
    #[serde(default)]
    pub signed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub record: SubmissionRecord,
    pub warnings: Vec<ValidationWarning>,
    /// Full generated text, for the on-screen panel.
    pub document_text: String,
    pub download_name: String,
    pub elapsed_ms: u64,
}

/// A note-only draft. The PDF stays in the session under `id`; the draft is
/// never written to the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct Draft {
    pub id: Uuid,
    /// Full generated text, for the on-screen panel.
    pub document_text: String,
    pub download_name: String,
    pub elapsed_ms: u64,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs the full submission pipeline for one session.
///
/// Steps:
/// 1. missing_required_fields() → reject before any network call
/// 2. collect_warnings() → advisory, returned to the caller
/// 3. render() → RenderedRequest
/// 4. completion.complete() → generated text (single attempt)
/// 5. document::build() on the blocking pool → PDF bytes
/// 6. append SubmissionRecord to the session ledger and keep the PDF for
///    download, atomically
pub async fn submit(
    session: &Session,
    completion: &dyn CompletionClient,
    settings: &PipelineSettings,
    request: SubmitRequest,
) -> Result<SubmissionOutcome, AppError> {
    let started = Instant::now();
    let SubmitRequest { form, signed } = request;

    // Step 1: Required fields
    let missing = missing_required_fields(&form);
    if !missing.is_empty() {
        info!(
            "Submission rejected in session {}: {} required field(s) empty",
            session.id,
            missing.len()
        );
        return Err(AppError::MissingRequiredField(missing));
    }

    // Step 2: Advisory format checks
    let warnings = collect_warnings(&form);
    for w in &warnings {
        warn!("Advisory validation warning on '{}': {}", w.field, w.message);
    }

    // Step 3: Render
    let generated_at = Utc::now();
    let rendered = render(&form, generated_at);

    // Step 4: Complete
    let document_text = completion.complete(rendered.as_str()).await?;
    info!(
        "Completion returned {} chars after {}ms",
        document_text.chars().count(),
        started.elapsed().as_millis()
    );

    // Step 5: Build PDF
    let title = format!(
        "Prior authorization request: {} ({})",
        form.request_type.display_name(),
        form.insurer.display_name()
    );
    let pdf = build_on_blocking_pool(
        document_text.clone(),
        title,
        generated_at,
        settings.page_style.clone(),
    )
    .await?;

    // Step 6: Ledger + PDF
    let record = SubmissionRecord {
        id: Uuid::new_v4(),
        timestamp: generated_at,
        form,
        truncated_document: settings.retention.snippet(&document_text),
        signed,
    };
    session
        .store_submission(record.clone(), Bytes::from(pdf))
        .await?;

    let elapsed_ms = started.elapsed().as_millis() as u64;
    info!(
        "Submission {} stored in session {} ({}ms, {} warning(s))",
        record.id,
        session.id,
        elapsed_ms,
        warnings.len()
    );

    Ok(SubmissionOutcome {
        download_name: document::download_file_name(record.id),
        record,
        warnings,
        document_text,
        elapsed_ms,
    })
}

/// Generates a PDF from a free-text note alone and keeps it in the session
/// for download. Nothing is written to the ledger.
pub async fn draft_from_note(
    session: &Session,
    completion: &dyn CompletionClient,
    settings: &PipelineSettings,
    note: &str,
) -> Result<Draft, AppError> {
    if note.trim().is_empty() {
        return Err(AppError::Validation(
            "Enter a patient note first".to_string(),
        ));
    }

    let started = Instant::now();
    let generated_at = Utc::now();
    let rendered = render_note_only(note);
    let document_text = completion.complete(rendered.as_str()).await?;

    let pdf = build_on_blocking_pool(
        document_text.clone(),
        "Prior authorization request".to_string(),
        generated_at,
        settings.page_style.clone(),
    )
    .await?;

    let id = Uuid::new_v4();
    session.drafts.lock().await.insert(id, Bytes::from(pdf));

    let elapsed_ms = started.elapsed().as_millis() as u64;
    info!(
        "Draft {} stored in session {} ({}ms)",
        id, session.id, elapsed_ms
    );

    Ok(Draft {
        id,
        document_text,
        download_name: DRAFT_DOWNLOAD_NAME.to_string(),
        elapsed_ms,
    })
}

/// Download name for note-only drafts.
pub const DRAFT_DOWNLOAD_NAME: &str = "prior_auth.pdf";

async fn build_on_blocking_pool(
    text: String,
    title: String,
    generated_at: DateTime<Utc>,
    style: PageStyle,
) -> Result<Vec<u8>, DocumentBuildError> {
    tokio::task::spawn_blocking(move || document::build(&text, &title, generated_at, &style))
        .await
        .map_err(|e| DocumentBuildError::Worker(e.to_string()))?
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

//! Axum route handlers for the prior authorization API.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::form::codes::{self, DiagnosticCode};
use crate::form::validation::{collect_warnings, missing_required_fields, ValidationWarning};
use crate::generation::pipeline::{
    draft_from_note, submit, Draft, SubmissionOutcome, SubmitRequest, DRAFT_DOWNLOAD_NAME,
};
use crate::generation::renderer::{render, RenderedRequest};
use crate::ledger::{LedgerOrder, SubmissionLedger};
use crate::models::form::FormInput;
use crate::models::submission::LedgerRow;
use crate::session::Session;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CodeQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct CodeSearchResponse {
    pub codes: Vec<DiagnosticCode>,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub missing_fields: Vec<&'static str>,
    pub warnings: Vec<ValidationWarning>,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub request_text: RenderedRequest,
}

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    #[serde(flatten)]
    pub draft: Draft,
    pub download_url: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    #[serde(flatten)]
    pub outcome: SubmissionOutcome,
    pub download_url: String,
}

#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub order: LedgerOrder,
}

#[derive(Debug, Serialize)]
pub struct LedgerResponse {
    pub rows: Vec<LedgerRow>,
    pub total: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn session_or_404(state: &AppState, session_id: Uuid) -> Result<std::sync::Arc<Session>, AppError> {
    state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))
}

fn pdf_response(bytes: impl Into<Bytes>, file_name: &str) -> Response {
    let body: Bytes = bytes.into();
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}

// ────────────────────────────────────────────────────────────────────────────
// Stateless handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/codes?q=
pub async fn handle_search_codes(AppQuery(params): AppQuery<CodeQuery>) -> Json<CodeSearchResponse> {
    Json(CodeSearchResponse {
        codes: codes::search(&params.q),
    })
}

/// POST /api/v1/validate
///
/// Reports blank required fields and advisory format warnings without
/// submitting anything.
pub async fn handle_validate(AppJson(form): AppJson<FormInput>) -> Json<ValidateResponse> {
    Json(ValidateResponse {
        missing_fields: missing_required_fields(&form),
        warnings: collect_warnings(&form),
    })
}

/// POST /api/v1/render
///
/// Previews the exact request text a submission would send.
pub async fn handle_render(AppJson(form): AppJson<FormInput>) -> Result<Json<RenderResponse>, AppError> {
    let missing = missing_required_fields(&form);
    if !missing.is_empty() {
        return Err(AppError::MissingRequiredField(missing));
    }
    Ok(Json(RenderResponse {
        request_text: render(&form, chrono::Utc::now()),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Session handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let session = state.sessions.create().await?;
    tracing::info!(
        "Created session {} at {} ({} active)",
        session.id,
        session.created_at,
        state.sessions.len().await
    );
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id: session.id,
        }),
    ))
}

/// DELETE /api/v1/sessions/:session_id
///
/// Ends the session; its ledger, PDFs and drafts are dropped.
pub async fn handle_delete_session(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    let session = state
        .sessions
        .remove(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    let ledger = session.ledger.lock().await;
    if ledger.is_empty() {
        tracing::info!("Ended session {session_id}");
    } else {
        tracing::info!(
            "Ended session {session_id}, dropping {} submission(s)",
            ledger.len()
        );
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:session_id/drafts
///
/// Note-only generation. The PDF is kept in the session for download;
/// nothing is recorded in the ledger.
pub async fn handle_draft(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
    AppJson(request): AppJson<DraftRequest>,
) -> Result<(StatusCode, Json<DraftResponse>), AppError> {
    let session = session_or_404(&state, session_id).await?;

    let draft = draft_from_note(
        &session,
        state.completion.as_ref(),
        &state.settings,
        &request.note,
    )
    .await?;
    let download_url = format!("/api/v1/sessions/{}/drafts/{}/pdf", session_id, draft.id);

    Ok((
        StatusCode::CREATED,
        Json(DraftResponse {
            draft,
            download_url,
        }),
    ))
}

/// GET /api/v1/sessions/:session_id/drafts/:id/pdf
pub async fn handle_download_draft(
    State(state): State<AppState>,
    AppPath((session_id, draft_id)): AppPath<(Uuid, Uuid)>,
) -> Result<Response, AppError> {
    let session = session_or_404(&state, session_id).await?;
    let bytes = session
        .drafts
        .lock()
        .await
        .get(&draft_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Draft {draft_id} not found")))?;

    Ok(pdf_response(bytes, DRAFT_DOWNLOAD_NAME))
}

/// POST /api/v1/sessions/:session_id/submissions
///
/// Full pipeline: validate → render → complete → PDF → ledger.
pub async fn handle_submit(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
    AppJson(request): AppJson<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let session = session_or_404(&state, session_id).await?;

    let outcome = submit(&session, state.completion.as_ref(), &state.settings, request).await?;
    let download_url = format!(
        "/api/v1/sessions/{}/submissions/{}/pdf",
        session_id, outcome.record.id
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            outcome,
            download_url,
        }),
    ))
}

/// GET /api/v1/sessions/:session_id/submissions?q=&order=
pub async fn handle_list_submissions(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
    AppQuery(params): AppQuery<LedgerQuery>,
) -> Result<Json<LedgerResponse>, AppError> {
    let session = session_or_404(&state, session_id).await?;
    let ledger = session.ledger.lock().await;

    let mut hits = ledger.query(&params.q);
    params.order.apply(&mut hits);
    let rows = SubmissionLedger::rows(hits);

    Ok(Json(LedgerResponse {
        rows,
        total: ledger.len(),
    }))
}

/// GET /api/v1/sessions/:session_id/submissions/:id/pdf
pub async fn handle_download(
    State(state): State<AppState>,
    AppPath((session_id, submission_id)): AppPath<(Uuid, Uuid)>,
) -> Result<Response, AppError> {
    let session = session_or_404(&state, session_id).await?;
    let bytes = session
        .submission_document(submission_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Submission {submission_id} not found")))?;

    Ok(pdf_response(
        bytes,
        &crate::document::download_file_name(submission_id),
    ))
}

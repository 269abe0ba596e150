//! Template Renderer: turns form input into the request text sent to the
//! completion service.
//!
//! Rendering is pure: the timestamp is passed in, never read from the clock,
//! so equal inputs always give equal output.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::{Captures, Regex};
use serde::Serialize;

use crate::form::codes;
use crate::generation::prompts::{FORM_PROMPT_TEMPLATE, NOTE_PROMPT_TEMPLATE, NOT_PROVIDED};
use crate::llm_client::prompts::{MARKER_INSTRUCTION, TERMINOLOGY_INSTRUCTION};
use crate::models::form::FormInput;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").unwrap());

/// The exact text sent as the single user message. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenderedRequest(String);

impl RenderedRequest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Substitutes `{name}` placeholders in one pass. Values are inserted
/// verbatim and are never re-scanned, so a value containing `{note}` stays
/// literal. Unknown placeholders are left untouched.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let key = &caps[1];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn optional(value: &Option<String>) -> &str {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => NOT_PROVIDED,
    }
}

/// Renders the full form prompt.
pub fn render(input: &FormInput, generated_at: DateTime<Utc>) -> RenderedRequest {
    let generated_at = generated_at.format("%Y-%m-%d %H:%M").to_string();
    let birth_date = input.birth_date.format("%Y-%m-%d").to_string();
    let phone = optional(&input.phone);
    let email = optional(&input.email);

    let text = fill_template(
        FORM_PROMPT_TEMPLATE,
        &[
            ("generated_at", generated_at.as_str()),
            ("full_name", input.full_name.as_str()),
            ("birth_date", birth_date.as_str()),
            ("identifier", input.identifier.as_str()),
            ("insurer", input.insurer.display_name()),
            ("phone", phone),
            ("email", email),
            ("request_type", input.request_type.display_name()),
            ("urgency", input.urgency.display_name()),
            ("diagnostic_code", input.diagnostic_code.as_str()),
            ("diagnostic_label", codes::label(&input.diagnostic_code)),
            ("note", input.note.as_str()),
            ("marker_instruction", MARKER_INSTRUCTION),
            ("terminology_instruction", TERMINOLOGY_INSTRUCTION),
        ],
    );

    RenderedRequest(text)
}

/// Renders the note-only prompt, where the model fills in every other field.
pub fn render_note_only(note: &str) -> RenderedRequest {
    RenderedRequest(fill_template(
        NOTE_PROMPT_TEMPLATE,
        &[
            ("note", note),
            ("marker_instruction", MARKER_INSTRUCTION),
            ("terminology_instruction", TERMINOLOGY_INSTRUCTION),
        ],
    ))
}

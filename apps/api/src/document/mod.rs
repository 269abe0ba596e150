// Document Builder: generated text -> sections -> wrapped blocks -> PDF bytes.
// PDF rendering is CPU-bound; async callers go through spawn_blocking.

pub mod font_metrics;
pub mod layout;
pub mod pdf;
pub mod sections;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::document::layout::BlockKind;

pub use layout::{default_page_style, PageStyle};

#[derive(Debug, Error)]
pub enum DocumentBuildError {
    #[error("PDF font error: {0}")]
    Font(String),

    #[error("PDF save error: {0}")]
    Save(String),

    #[error("Document worker failed: {0}")]
    Worker(String),
}

/// Builds a complete PDF for `text`: title block, headed sections, footer
/// stamped with `generated_at`.
pub fn build(
    text: &str,
    title: &str,
    generated_at: DateTime<Utc>,
    style: &PageStyle,
) -> Result<Vec<u8>, DocumentBuildError> {
    let layout = layout::layout(text, title, generated_at, style);
    debug!(
        "Laid out {} heading(s) and {} paragraph(s)",
        layout.count(BlockKind::Heading),
        layout.count(BlockKind::Paragraph)
    );
    pdf::render_pdf(&layout, style)
}

/// Download name for a stored document.
pub fn download_file_name(id: impl std::fmt::Display) -> String {
    format!("prior_auth_{id}.pdf")
}

use std::sync::Arc;

use crate::document::PageStyle;
use crate::ledger::RetentionPolicy;
use crate::llm_client::CompletionClient;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable completion backend. Production: `ChatCompletionClient`.
    pub completion: Arc<dyn CompletionClient>,
    pub sessions: Arc<SessionStore>,
    pub settings: PipelineSettings,
}

/// Knobs the generation pipeline reads on every submission.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub page_style: PageStyle,
    pub retention: RetentionPolicy,
}

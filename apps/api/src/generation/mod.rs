// Request generation
// Implements: prompt rendering, the submission pipeline, note-only drafts, HTTP handlers.
// All completion calls go through llm_client; nothing here talks to the network directly.

pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod renderer;

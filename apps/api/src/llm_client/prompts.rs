// Shared prompt fragments. Each service that builds prompts keeps its own
// prompts.rs alongside it; this file holds the cross-cutting pieces.

/// Closing instruction appended to every form prompt.
pub const TERMINOLOGY_INSTRUCTION: &str =
    "Use Dutch medical terminology exclusively and keep the tone professional.";

/// Tells the model to keep the section markers intact so the document
/// builder can split the answer back into headed blocks.
pub const MARKER_INSTRUCTION: &str = "\
    Keep every section header line exactly as given, including the surrounding '===' markers. \
    Do not add new '===' lines and do not use markdown.";

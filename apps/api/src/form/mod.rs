// Form-level checks and lookups. Pure functions only; nothing here talks to
// the completion service.

pub mod codes;
pub mod validation;

use std::time::Duration;

use anyhow::{Context, Result};

use crate::ledger::RetentionPolicy;
use crate::llm_client::DEFAULT_API_URL;
use crate::session::SessionLimits;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential for the completion service.
    pub groq_api_key: String,
    pub completion_api_url: String,
    pub completion_timeout: Duration,
    pub retention: RetentionPolicy,
    pub session_limits: SessionLimits,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            groq_api_key: require_env("GROQ_API_KEY")?,
            completion_api_url: std::env::var("COMPLETION_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            completion_timeout: Duration::from_secs(parse_env(
                "COMPLETION_TIMEOUT_SECS",
                60,
                "COMPLETION_TIMEOUT_SECS must be a whole number of seconds",
            )?),
            retention: RetentionPolicy {
                snippet_chars: parse_env(
                    "LEDGER_SNIPPET_CHARS",
                    RetentionPolicy::default().snippet_chars,
                    "LEDGER_SNIPPET_CHARS must be a non-negative integer",
                )?,
            },
            session_limits: SessionLimits {
                idle_ttl: Duration::from_secs(parse_env(
                    "SESSION_IDLE_TTL_SECS",
                    SessionLimits::default().idle_ttl.as_secs(),
                    "SESSION_IDLE_TTL_SECS must be a whole number of seconds",
                )?),
                max_sessions: parse_env(
                    "MAX_SESSIONS",
                    SessionLimits::default().max_sessions,
                    "MAX_SESSIONS must be a non-negative integer",
                )?,
            },
            port: parse_env("PORT", 8080, "PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T, msg: &'static str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().context(msg),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let v: u64 = parse_env("PRIORAUTH_TEST_UNSET_VARIABLE", 42, "bad").unwrap();
        assert_eq!(v, 42);
    }
}

//! Error types for copilot-core.

use thiserror::Error;

/// Result type alias using copilot-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while answering or servicing a request.
///
/// Every variant maps to exactly one user-visible warning code via
/// [`Error::warning_code`]; the orchestrator is the only place allowed to
/// turn one of these into a [`crate::domain::CopilotResponse`].
#[derive(Error, Debug)]
pub enum Error {
    /// Caller exceeded their per-hour or per-day quota.
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    /// The model server is unreachable or the circuit breaker is open.
    #[error("model offline: {0}")]
    ModelOffline(String),

    /// A transient model-server failure (timeout, 5xx, connection reset).
    #[error("transient model error: {0}")]
    ModelTransient(String),

    /// The model reply could not be validated into a well-formed response.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// A prompt-injection or prompt-leak attempt was detected.
    #[error("security flag: {0}")]
    SecurityFlag(String),

    /// The retrieval store is degraded; the request can proceed without RAG.
    #[error("retrieval degraded: {0}")]
    RetrievalDegraded(String),

    /// A write to the conversation/audit store failed.
    #[error("persistence failed: {0}")]
    PersistenceFailed(String),

    /// The inbound request failed validation before any downstream call.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// SQLite storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Operation exceeded its wall-clock budget.
    #[error("operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Internal invariant violation; should never surface to a caller.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The user-visible warning code this error maps to (SPEC §7).
    pub fn warning_code(&self) -> &'static str {
        match self {
            Error::RateLimited(_) => "RATE_LIMITED",
            Error::ModelOffline(_) | Error::Timeout { .. } => "MODEL_OFFLINE",
            Error::ModelTransient(_) => "MODEL_OFFLINE",
            Error::ValidationFailed(_) => "VALIDATION_FAILED",
            Error::SecurityFlag(_) => "SECURITY_FLAG",
            Error::RetrievalDegraded(_) => "INSUFFICIENT_EVIDENCE",
            Error::PersistenceFailed(_) => "VALIDATION_FAILED",
            Error::BadRequest(_) => "VALIDATION_FAILED",
            Error::Storage(_) | Error::Serialization(_) | Error::Config(_) | Error::Internal(_) => {
                "VALIDATION_FAILED"
            }
        }
    }

    /// A plain, non-technical summary safe to show to an end user.
    ///
    /// Never includes the underlying message: that may contain SQL, prompt
    /// content, or other internals the spec forbids leaking.
    pub fn user_summary(&self) -> &'static str {
        match self {
            Error::RateLimited(_) => "You've reached the request limit for now — please try again later.",
            Error::ModelOffline(_) | Error::ModelTransient(_) | Error::Timeout { .. } => {
                "The assistant model is unavailable right now — please try again shortly."
            }
            Error::ValidationFailed(_) | Error::Storage(_) | Error::Serialization(_) | Error::Config(_) | Error::Internal(_) => {
                "I couldn't validate my own answer — please rephrase."
            }
            Error::SecurityFlag(_) => "I can't help with that request.",
            Error::RetrievalDegraded(_) => "I don't have enough verified information to answer that yet.",
            Error::PersistenceFailed(_) => "Your answer is ready, but it may not be saved to history.",
            Error::BadRequest(_) => "That request isn't valid — please check it and try again.",
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Error::Storage(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_codes_match_spec_table() {
        assert_eq!(Error::RateLimited("x".into()).warning_code(), "RATE_LIMITED");
        assert_eq!(Error::ModelOffline("x".into()).warning_code(), "MODEL_OFFLINE");
        assert_eq!(Error::SecurityFlag("x".into()).warning_code(), "SECURITY_FLAG");
        assert_eq!(
            Error::ValidationFailed("x".into()).warning_code(),
            "VALIDATION_FAILED"
        );
    }

    #[test]
    fn user_summaries_never_echo_internal_message() {
        let err = Error::Internal("select * from messages where tenant_id = 'acme'".into());
        assert!(!err.user_summary().contains("select"));
    }
}

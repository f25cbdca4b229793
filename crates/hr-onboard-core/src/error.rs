//! Domain error taxonomy for the onboarding desk.
//!
//! Validation kinds (`InvalidScope`, `InvalidMode`, `InapplicableField`, `OutOfRange`,
//! `Validation`) are produced before any storage access. Storage constraint violations are
//! translated by the services into `DuplicateIdentifier` / `DuplicateOrder`.

use crate::store::StoreError;

/// Why the AI completion service could not produce an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamFailure {
    /// Endpoint or API key missing from configuration.
    NotConfigured,
    Timeout,
    /// Non-200 status from the completion endpoint.
    Status(u16),
    /// 200 with a body that carries no answer.
    Malformed(String),
    /// Connection refused, DNS, TLS and friends.
    Transport(String),
}

impl std::fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamFailure::NotConfigured => write!(f, "not configured"),
            UpstreamFailure::Timeout => write!(f, "timed out"),
            UpstreamFailure::Status(code) => write!(f, "status {}", code),
            UpstreamFailure::Malformed(detail) => write!(f, "malformed response: {}", detail),
            UpstreamFailure::Transport(detail) => write!(f, "transport: {}", detail),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HrError {
    #[error("Scope must be one of: onboarding, employee (got '{0}')")]
    InvalidScope(String),

    #[error("Mode must be one of: guided, global, auto (got '{0}')")]
    InvalidMode(String),

    #[error("{field} is not applicable for {context}")]
    InapplicableField {
        field: &'static str,
        context: &'static str,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{field} '{value}' already exists")]
    DuplicateIdentifier { field: &'static str, value: String },

    #[error("Step {value} already exists")]
    DuplicateOrder { field: &'static str, value: u32 },

    #[error("{0}")]
    EmptyCorpus(String),

    #[error("AI service unavailable: {0}")]
    UpstreamUnavailable(UpstreamFailure),

    #[error("{field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl HrError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        HrError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Field name carried by duplicate errors (used for the 409 payload).
    pub fn duplicate_field(&self) -> Option<&'static str> {
        match self {
            HrError::DuplicateIdentifier { field, .. } | HrError::DuplicateOrder { field, .. } => {
                Some(field)
            }
            _ => None,
        }
    }
}

pub type HrResult<T> = Result<T, HrError>;

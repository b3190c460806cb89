//! Service error taxonomy
//!
//! Two fatal error kinds cross component boundaries: validation failures
//! (caller's fault, surfaced with a message) and classifier failures
//! (internal, surfaced generically). Everything else in the system is a
//! non-error condition carried in normal return values: preprocessing
//! assumptions, rate-gate rejections, stale data, and subscriber drops.

use thiserror::Error;

/// Fatal errors surfaced to request callers.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed input, unrecognized enum value, or out-of-schema payload.
    /// Maps to a 4xx response. Never retried.
    #[error("validation error: {0}")]
    Validation(String),

    /// Classifier invocation failed. Fatal to the request; reported as an
    /// internal error without leaking detail. Never retried internally.
    #[error("classifier failure: {0}")]
    Classifier(String),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_preserved() {
        let err = ServiceError::validation("unknown domain: weather");
        assert_eq!(
            err.to_string(),
            "validation error: unknown domain: weather"
        );
    }
}

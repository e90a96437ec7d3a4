//! Error types for the Aegis mediation pipeline.
//!
//! Fallible operations (policy loading, step-request decoding, plan building)
//! return `AegisResult<T>`. The mediator never surfaces these to its caller:
//! every planning error is turned into a REFUSE decision at that boundary.

use thiserror::Error;

/// The unified error type for the Aegis crates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AegisError {
    /// A plan could not be built. Carries every violation found across all
    /// steps, in step order, so the caller sees the complete picture.
    #[error("plan failed validation:\n- {}", violations.join("\n- "))]
    PlanValidation { violations: Vec<String> },

    /// The policy document could not be read or parsed as a whole.
    #[error("policy document error: {reason}")]
    PolicyDocument { reason: String },

    /// A step request arrived in a shape that cannot be decoded at all.
    #[error("malformed step request: {reason}")]
    MalformedRequest { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

impl AegisError {
    /// The individual violation messages carried by this error.
    ///
    /// `PlanValidation` yields its full list; every other variant yields its
    /// rendered message as a single entry.
    pub fn violations(&self) -> Vec<String> {
        match self {
            AegisError::PlanValidation { violations } => violations.clone(),
            other => vec![other.to_string()],
        }
    }
}

/// Convenience alias used throughout the Aegis crates.
pub type AegisResult<T> = Result<T, AegisError>;

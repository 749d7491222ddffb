//! Error types for the GTAF runtime crates.
//!
//! The gate itself never returns these to its caller: pipeline faults are
//! converted into a `DENY / INTERNAL_ERROR` result at the boundary. They are
//! surfaced directly by the collaborators around the gate (configuration,
//! schema documents, fixtures, audit sinks).

use thiserror::Error;

/// The unified error type for the GTAF runtime.
#[derive(Debug, Error)]
pub enum GtafError {
    /// An artifact pool entry does not have the shape its ref group requires.
    ///
    /// Inside the gate this is a fault, not a policy denial.
    #[error("artifact '{id}' is malformed: {reason}")]
    MalformedArtifact { id: String, reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A JSON Schema document could not be loaded or compiled.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },

    /// The audit writer could not persist an evaluation record.
    ///
    /// A decision that cannot be recorded does not execute.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },

    /// An input document could not be read or parsed.
    #[error("failed to load '{path}': {reason}")]
    Input { path: String, reason: String },

    /// A fixture case could not be read or parsed.
    #[error("fixture error: {reason}")]
    Fixture { reason: String },
}

/// Convenience alias used throughout the GTAF crates.
pub type GtafResult<T> = Result<T, GtafError>;

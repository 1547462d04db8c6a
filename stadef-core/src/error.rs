//! Error types for station definition operations

use crate::EntityKind;
use thiserror::Error;

/// Storage and delegate errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {kind} with id {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Repository failure for {kind}: {reason}")]
    RepositoryFailure { kind: EntityKind, reason: String },
}

/// Validation errors for accessor arguments.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid range: {reason}")]
    InvalidRange { reason: String },
}

/// Faceting resolution errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FacetingError {
    #[error("Faceting definition class type mismatch: expected {expected}, got {actual}")]
    ClassTypeMismatch { expected: String, actual: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all station definition errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StadefError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Faceting error: {0}")]
    Faceting(#[from] FacetingError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl StadefError {
    /// Shorthand for a missing required argument.
    pub fn missing(field: impl Into<String>) -> Self {
        StadefError::Validation(ValidationError::RequiredFieldMissing {
            field: field.into(),
        })
    }

    /// Shorthand for an end time that precedes the start time.
    pub fn invalid_range(reason: impl Into<String>) -> Self {
        StadefError::Validation(ValidationError::InvalidRange {
            reason: reason.into(),
        })
    }
}

/// Result type alias for station definition operations.
pub type StadefResult<T> = Result<T, StadefError>;

// =============================================================================
// TESTS
// =============================================================================

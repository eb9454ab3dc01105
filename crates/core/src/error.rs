//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// The kinds of records the domain knows about.
///
/// Used to tag `NotFound` / `AlreadyExists` so callers can tell *which* lookup
/// failed without string matching.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Organization,
    Responsibility,
    Tender,
    Bid,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Organization => "Organization",
            EntityKind::Responsibility => "Responsibility",
            EntityKind::Tender => "Tender",
            EntityKind::Bid => "Bid",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain-level error.
///
/// Closed set of outcomes every engine operation can report. Transport layers map
/// each variant to a status code; storage adapters map their own failures into
/// `NotFound` / `AlreadyExists` / `Storage`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated (e.g. a disallowed status transition).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("{0} not found")]
    NotFound(EntityKind),

    #[error("{0} already exists")]
    AlreadyExists(EntityKind),

    /// Stale version under compare-and-swap.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The requester is not responsible for the owning organization.
    #[error("forbidden")]
    Forbidden,

    /// Persistence failed for a reason the domain cannot act on.
    #[error("storage failure in {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(kind: EntityKind) -> Self {
        Self::NotFound(kind)
    }

    pub fn already_exists(kind: EntityKind) -> Self {
        Self::AlreadyExists(kind)
    }

    pub fn storage(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Storage {
            operation,
            message: message.into(),
        }
    }

    /// Stable, user-facing message. Never includes storage diagnostics.
    pub fn public_message(&self) -> String {
        match self {
            DomainError::Validation(_) | DomainError::InvalidId(_) => "Invalid request".to_string(),
            DomainError::InvariantViolation(msg) => msg.clone(),
            DomainError::NotFound(kind) => format!("{kind} not found"),
            DomainError::AlreadyExists(kind) => format!("{kind} already exists"),
            DomainError::Conflict(_) => "Version conflict".to_string(),
            DomainError::Forbidden => "Forbidden".to_string(),
            DomainError::Storage { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_message_hides_storage_detail() {
        let err = DomainError::storage("insert_tender", "connection reset by peer");
        assert_eq!(err.public_message(), "Internal server error");
        assert!(err.to_string().contains("insert_tender"));
    }

    #[test]
    fn not_found_message_names_the_entity() {
        assert_eq!(
            DomainError::not_found(EntityKind::Tender).public_message(),
            "Tender not found"
        );
        assert_eq!(
            DomainError::already_exists(EntityKind::User).to_string(),
            "User already exists"
        );
    }
}

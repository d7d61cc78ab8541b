//! Error types shared by every store and manager in the platform.

use thiserror::Error;

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Error taxonomy for the reservation-and-review domain.
///
/// Every fallible operation in the platform reports one of these
/// categories. The web layer translates them mechanically into HTTP
/// statuses, so a store never needs to know it is serving HTTP.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    // ═══════════════════════════════════════════════════════════
    // Caller Errors
    // ═══════════════════════════════════════════════════════════
    /// Input was malformed or out of range before any storage was touched.
    #[error("{0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of entity that was looked up (e.g. "client").
        entity: &'static str,
        /// Identifier that failed the lookup.
        id: String,
    },

    /// A required prior state is missing, such as reviewing a restaurant
    /// that never issued an invoice to the client.
    #[error("{0}")]
    Precondition(String),

    /// The operation lost to an earlier write, such as a second review
    /// against an invoice that already carries one.
    #[error("{0}")]
    Conflict(String),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════
    /// The underlying store failed.
    #[error("Store error: {0}")]
    Store(String),
}

impl DomainError {
    /// Builds a [`DomainError::Validation`] from any message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Builds a [`DomainError::NotFound`] for an entity kind and id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Builds a [`DomainError::Precondition`] from any message.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Builds a [`DomainError::Conflict`] from any message.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Returns `true` if this error is the caller's fault rather than a
    /// system failure.
    ///
    /// # Examples
    ///
    /// ```
    /// # use the_knife_core::error::DomainError;
    /// assert!(DomainError::validation("bad party size").is_caller_error());
    /// assert!(!DomainError::Store("pool gone".into()).is_caller_error());
    /// ```
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound { .. } | Self::Precondition(_) | Self::Conflict(_)
        )
    }
}

use std::time::Duration;

/// Errors surfaced by the query layer.
///
/// Validation and not-found errors are caused by the request. The remaining
/// variants come from the datastores and may succeed on retry.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// A request parameter was rejected before any query ran
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Offending parameter
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
    /// An exact-match lookup found nothing
    #[error("{entity} {key} not found")]
    NotFound {
        /// Kind of record looked up
        entity: &'static str,
        /// Lookup key
        key: String,
    },
    /// The operation did not finish before its deadline
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        /// Operation name
        operation: &'static str,
        /// Deadline that elapsed
        after: Duration,
    },
    /// A datastore query failed
    #[error("{operation} failed: {cause}")]
    Infrastructure {
        /// Operation name
        operation: &'static str,
        /// Underlying failure
        cause: eyre::Report,
    },
}

impl QueryError {
    /// Shorthand for [`QueryError::Validation`].
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation { field, reason: reason.into() }
    }

    /// Shorthand for [`QueryError::Infrastructure`].
    pub const fn infrastructure(operation: &'static str, cause: eyre::Report) -> Self {
        Self::Infrastructure { operation, cause }
    }

    /// Whether retrying the same request may succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Infrastructure { .. })
    }
}

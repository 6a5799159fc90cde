//! Error types for source adapters and the series resolver.

use std::fmt;
use thiserror::Error;

use orgcal_store::StoreError;

/// The category of an adapter error.
///
/// Used when logging skipped sources and in partial-result accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterErrorCode {
    /// Reading from the backing store or upstream failed.
    FetchFailed,
    /// A stored row violated the source's own contract.
    InvalidRow,
    /// The adapter did not answer within its time budget.
    Timeout,
    /// Unexpected adapter state, a bug.
    InternalError,
}

impl AdapterErrorCode {
    /// Returns a stable snake_case name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchFailed => "fetch_failed",
            Self::InvalidRow => "invalid_row",
            Self::Timeout => "timeout",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for AdapterErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error produced by one source adapter.
///
/// Adapter errors never abort a timeline request; the aggregator logs them
/// and serves the sources that did answer.
#[derive(Debug, Error)]
pub struct AdapterError {
    /// The error code categorizing this error.
    code: AdapterErrorCode,
    /// A human-readable message describing the error.
    message: String,
    /// The underlying cause of this error, if any.
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AdapterError {
    /// Creates a new adapter error with the given code and message.
    pub fn new(code: AdapterErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a fetch error.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorCode::FetchFailed, message)
    }

    /// Creates an invalid-row error.
    pub fn invalid_row(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorCode::InvalidRow, message)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorCode::Timeout, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorCode::InternalError, message)
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> AdapterErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if this error came from the adapter time budget.
    pub fn is_timeout(&self) -> bool {
        self.code == AdapterErrorCode::Timeout
    }
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<StoreError> for AdapterError {
    fn from(err: StoreError) -> Self {
        Self::fetch("store read failed").with_source(err)
    }
}

/// A specialized Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Errors produced by the series resolver.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The targeted event does not exist in the organization.
    #[error("no such event: {id}")]
    NotFound { id: String },

    /// The store failed mid-resolution.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResolverError {
    /// Creates a not-found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Returns the machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } | Self::Store(StoreError::NotFound { .. }) => "not_found",
            Self::Store(_) => "resolver_failure",
        }
    }
}

/// A specialized Result type for resolver operations.
pub type ResolverResult<T> = Result<T, ResolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_display() {
        assert_eq!(AdapterErrorCode::FetchFailed.as_str(), "fetch_failed");
        assert_eq!(AdapterErrorCode::Timeout.as_str(), "timeout");
        assert_eq!(AdapterErrorCode::InvalidRow.to_string(), "invalid_row");
    }

    #[test]
    fn adapter_error_creation() {
        let err = AdapterError::invalid_row("event ev-3 ends before it starts");
        assert_eq!(err.code(), AdapterErrorCode::InvalidRow);
        assert_eq!(err.message(), "event ev-3 ends before it starts");
        assert!(!err.is_timeout());
    }

    #[test]
    fn adapter_error_display() {
        let err = AdapterError::timeout("no answer after 10s");
        let display = format!("{err}");
        assert!(display.contains("timeout"));
        assert!(display.contains("no answer after 10s"));
    }

    #[test]
    fn adapter_error_from_store_error_keeps_the_cause() {
        use std::error::Error;
        let err = AdapterError::from(StoreError::backend("connection reset"));
        assert_eq!(err.code(), AdapterErrorCode::FetchFailed);
        assert!(err.source().is_some());
    }

    #[test]
    fn resolver_error_codes() {
        assert_eq!(ResolverError::not_found("ev-9").code(), "not_found");
        assert_eq!(
            ResolverError::Store(StoreError::not_found("ev-9")).code(),
            "not_found"
        );
        assert_eq!(
            ResolverError::Store(StoreError::backend("down")).code(),
            "resolver_failure"
        );
    }
}

//! The [`SourceAdapter`] trait: one implementation per calendar source.
//!
//! Adapters own the full path from stored rows to in-window
//! [`UnifiedEvent`]s: they fetch, normalize field names and shapes, apply
//! the window's overlap predicate, and scope ids with their source prefix.
//! The aggregator treats them uniformly and never sees raw rows.

use orgcal_core::{SourceKind, TimeWindow, UnifiedEvent};
use orgcal_store::BoxFuture;

use crate::error::{AdapterError, AdapterResult};

/// Everything an adapter needs to answer one timeline request.
#[derive(Debug, Clone)]
pub struct FetchContext {
    /// Organization the timeline belongs to.
    pub organization_id: String,
    /// Member viewing the timeline; scopes personal sources.
    pub user_id: String,
    /// Validated query window.
    pub window: TimeWindow,
}

impl FetchContext {
    /// Creates a fetch context.
    pub fn new(
        organization_id: impl Into<String>,
        user_id: impl Into<String>,
        window: TimeWindow,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            user_id: user_id.into(),
            window,
        }
    }
}

/// One calendar source, normalized.
///
/// Implementations must only return events overlapping `ctx.window` (for
/// recurrence-backed sources, overlap is judged on local dates), with ids
/// already scoped by [`SourceKind::scoped_id`]. A failed adapter returns
/// an error and the aggregator drops just that source from the response.
pub trait SourceAdapter: Send + Sync {
    /// Which source this adapter serves.
    fn kind(&self) -> SourceKind;

    /// Fetches and normalizes this source's events for one request.
    fn fetch<'a>(&'a self, ctx: &'a FetchContext)
    -> BoxFuture<'a, AdapterResult<Vec<UnifiedEvent>>>;
}

/// An adapter that always fails.
///
/// Useful for exercising partial-result behavior in tests and as a
/// placeholder for a source that failed to initialize.
#[derive(Debug)]
pub struct ErrorAdapter {
    kind: SourceKind,
    error: AdapterError,
}

impl ErrorAdapter {
    /// Creates a new error adapter.
    pub fn new(kind: SourceKind, error: AdapterError) -> Self {
        Self { kind, error }
    }
}

impl SourceAdapter for ErrorAdapter {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn fetch<'a>(
        &'a self,
        _ctx: &'a FetchContext,
    ) -> BoxFuture<'a, AdapterResult<Vec<UnifiedEvent>>> {
        // Rebuild from parts since AdapterError itself is not cloneable
        let error = AdapterError::new(self.error.code(), self.error.message());
        Box::pin(async move { Err(error) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn fetch_context_creation() {
        let window = TimeWindow::new(
            Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 8, 0, 0, 0).unwrap(),
        );
        let ctx = FetchContext::new("org-1", "user-1", window);
        assert_eq!(ctx.organization_id, "org-1");
        assert_eq!(ctx.user_id, "user-1");
    }

    #[tokio::test]
    async fn error_adapter_always_fails() {
        let adapter = ErrorAdapter::new(SourceKind::Feed, AdapterError::fetch("upstream is down"));
        assert_eq!(adapter.kind(), SourceKind::Feed);

        let window = TimeWindow::new(
            Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 8, 0, 0, 0).unwrap(),
        );
        let ctx = FetchContext::new("org-1", "user-1", window);
        let err = adapter.fetch(&ctx).await.unwrap_err();
        assert_eq!(err.message(), "upstream is down");
    }
}

//! The [`CalendarStore`] trait: the async seam between the timeline engine
//! and whatever holds the data.
//!
//! Backends implement object-safe methods returning [`BoxFuture`]s so the
//! engine can hold them as trait objects. Read methods may return a coarse
//! superset of any window the caller has in mind; precise overlap filtering
//! always happens in the caller.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::rows::{ClassScheduleRow, FeedItemRow, ImportedOccurrenceRow, OrgEventRow};

/// A boxed future for async trait methods.
///
/// Async functions in traits do not mix with dynamic dispatch, so trait
/// methods return boxed futures to stay object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors produced by store backends.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A row addressed by id does not exist in the given organization.
    #[error("no such event: {id}")]
    NotFound { id: String },

    /// A multi-row delete applied to only some of the requested rows.
    #[error("delete applied to {applied} of {requested} events")]
    PartialDelete { requested: usize, applied: usize },

    /// The backend itself failed.
    #[error("store backend error: {message}")]
    Backend { message: String },
}

impl StoreError {
    /// Creates a not-found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// What a backend can supply beyond the required row fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCapabilities {
    /// Whether imported occurrences carry usable location text. Backends
    /// that import from systems without location data leave this off and
    /// the engine drops the field instead of surfacing stale values.
    pub imported_location: bool,
}

impl StoreCapabilities {
    /// Builder: declare imported occurrence locations usable.
    pub fn with_imported_location(mut self, supported: bool) -> Self {
        self.imported_location = supported;
        self
    }
}

/// Async storage access for every calendar source.
///
/// The `until` parameter on read methods is an upper bound only: rows
/// starting after it are never needed, rows before it may or may not
/// overlap the caller's window. Backends filter what is cheap for them
/// and leave precision to the caller.
pub trait CalendarStore: Send + Sync {
    /// Backend capability flags, fixed at construction.
    fn capabilities(&self) -> StoreCapabilities;

    /// Live (non-deleted) events of an organization starting at or before
    /// `until`.
    fn org_events<'a>(
        &'a self,
        organization_id: &'a str,
        until: DateTime<Utc>,
    ) -> BoxFuture<'a, StoreResult<Vec<OrgEventRow>>>;

    /// Imported occurrences of an organization starting at or before
    /// `until`, regardless of status.
    fn imported_occurrences<'a>(
        &'a self,
        organization_id: &'a str,
        until: DateTime<Utc>,
    ) -> BoxFuture<'a, StoreResult<Vec<ImportedOccurrenceRow>>>;

    /// Feed items visible to `user_id` inside `organization_id`: items of
    /// org-level feeds plus items of the user's personal feeds.
    fn feed_items<'a>(
        &'a self,
        organization_id: &'a str,
        user_id: &'a str,
        until: DateTime<Utc>,
    ) -> BoxFuture<'a, StoreResult<Vec<FeedItemRow>>>;

    /// Live class schedule rules of `user_id` inside `organization_id`.
    /// Rules are returned whole; date bounding happens during expansion.
    fn class_schedules<'a>(
        &'a self,
        organization_id: &'a str,
        user_id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Vec<ClassScheduleRow>>>;

    /// Looks up one event by id within an organization. Soft-deleted rows
    /// are reported as absent.
    fn org_event<'a>(
        &'a self,
        organization_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<OrgEventRow>>>;

    /// All live events sharing a recurrence group, ordered by start
    /// instant ascending.
    fn events_in_series<'a>(
        &'a self,
        organization_id: &'a str,
        recurrence_group_id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Vec<OrgEventRow>>>;

    /// Soft-deletes the given events, all or nothing.
    ///
    /// Ids already deleted count as applied, so retries are safe. An id
    /// that never existed in the organization fails the whole call with
    /// [`StoreError::NotFound`] and no row is touched. Returns the number
    /// of rows covered.
    fn soft_delete_events<'a>(
        &'a self,
        organization_id: &'a str,
        event_ids: &'a [String],
    ) -> BoxFuture<'a, StoreResult<usize>>;
}

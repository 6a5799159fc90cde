//! In-memory [`CalendarStore`] backend.
//!
//! Backs the server's seed mode and most engine tests. Rows live in plain
//! vectors behind one async lock; every read clones what it returns, so
//! callers never observe later mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::rows::{ClassScheduleRow, FeedItemRow, ImportedOccurrenceRow, OrgEventRow};
use crate::store::{BoxFuture, CalendarStore, StoreCapabilities, StoreError, StoreResult};

/// A serializable dump of every table, used as the seed file format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Direct organization events.
    #[serde(default)]
    pub events: Vec<OrgEventRow>,
    /// Imported schedule occurrences.
    #[serde(default)]
    pub imported: Vec<ImportedOccurrenceRow>,
    /// Connected feed items.
    #[serde(default)]
    pub feeds: Vec<FeedItemRow>,
    /// Class schedule rules.
    #[serde(default)]
    pub classes: Vec<ClassScheduleRow>,
}

#[derive(Debug, Default)]
struct Inner {
    events: Vec<OrgEventRow>,
    imported: Vec<ImportedOccurrenceRow>,
    feeds: Vec<FeedItemRow>,
    classes: Vec<ClassScheduleRow>,
}

/// In-memory store over async-locked vectors.
#[derive(Debug)]
pub struct MemoryStore {
    capabilities: StoreCapabilities,
    inner: RwLock<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store. Imported rows here keep their location text,
    /// so the capability is on.
    pub fn new() -> Self {
        Self {
            capabilities: StoreCapabilities::default().with_imported_location(true),
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Creates a store pre-populated from a snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            capabilities: StoreCapabilities::default().with_imported_location(true),
            inner: RwLock::new(Inner {
                events: snapshot.events,
                imported: snapshot.imported,
                feeds: snapshot.feeds,
                classes: snapshot.classes,
            }),
        }
    }

    /// Builder: override the advertised capabilities.
    pub fn with_capabilities(mut self, capabilities: StoreCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Inserts a direct organization event.
    pub async fn insert_event(&self, row: OrgEventRow) {
        self.inner.write().await.events.push(row);
    }

    /// Inserts an imported occurrence.
    pub async fn insert_imported(&self, row: ImportedOccurrenceRow) {
        self.inner.write().await.imported.push(row);
    }

    /// Inserts a feed item.
    pub async fn insert_feed_item(&self, row: FeedItemRow) {
        self.inner.write().await.feeds.push(row);
    }

    /// Inserts a class schedule rule.
    pub async fn insert_class_schedule(&self, row: ClassScheduleRow) {
        self.inner.write().await.classes.push(row);
    }
}

impl CalendarStore for MemoryStore {
    fn capabilities(&self) -> StoreCapabilities {
        self.capabilities
    }

    fn org_events<'a>(
        &'a self,
        organization_id: &'a str,
        until: DateTime<Utc>,
    ) -> BoxFuture<'a, StoreResult<Vec<OrgEventRow>>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            Ok(inner
                .events
                .iter()
                .filter(|row| {
                    row.organization_id == organization_id
                        && !row.is_deleted()
                        && row.start_at <= until
                })
                .cloned()
                .collect())
        })
    }

    fn imported_occurrences<'a>(
        &'a self,
        organization_id: &'a str,
        until: DateTime<Utc>,
    ) -> BoxFuture<'a, StoreResult<Vec<ImportedOccurrenceRow>>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            Ok(inner
                .imported
                .iter()
                .filter(|row| row.organization_id == organization_id && row.start_at <= until)
                .cloned()
                .collect())
        })
    }

    fn feed_items<'a>(
        &'a self,
        organization_id: &'a str,
        user_id: &'a str,
        until: DateTime<Utc>,
    ) -> BoxFuture<'a, StoreResult<Vec<FeedItemRow>>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            Ok(inner
                .feeds
                .iter()
                .filter(|row| {
                    let org_feed = row.organization_id.as_deref() == Some(organization_id);
                    let own_feed = row.owner_user_id.as_deref() == Some(user_id);
                    (org_feed || own_feed) && row.start_at <= until
                })
                .cloned()
                .collect())
        })
    }

    fn class_schedules<'a>(
        &'a self,
        organization_id: &'a str,
        user_id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Vec<ClassScheduleRow>>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            Ok(inner
                .classes
                .iter()
                .filter(|row| {
                    row.organization_id == organization_id
                        && row.user_id == user_id
                        && !row.is_deleted()
                })
                .cloned()
                .collect())
        })
    }

    fn org_event<'a>(
        &'a self,
        organization_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<OrgEventRow>>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            Ok(inner
                .events
                .iter()
                .find(|row| {
                    row.id == event_id
                        && row.organization_id == organization_id
                        && !row.is_deleted()
                })
                .cloned())
        })
    }

    fn events_in_series<'a>(
        &'a self,
        organization_id: &'a str,
        recurrence_group_id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Vec<OrgEventRow>>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            let mut rows: Vec<OrgEventRow> = inner
                .events
                .iter()
                .filter(|row| {
                    row.organization_id == organization_id
                        && row.recurrence_group_id.as_deref() == Some(recurrence_group_id)
                        && !row.is_deleted()
                })
                .cloned()
                .collect();
            rows.sort_by_key(|row| row.start_at);
            Ok(rows)
        })
    }

    fn soft_delete_events<'a>(
        &'a self,
        organization_id: &'a str,
        event_ids: &'a [String],
    ) -> BoxFuture<'a, StoreResult<usize>> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;

            // Validate everything before touching anything: the delete is
            // all or nothing. Rows already deleted still count as present.
            for id in event_ids {
                let exists = inner
                    .events
                    .iter()
                    .any(|row| &row.id == id && row.organization_id == organization_id);
                if !exists {
                    return Err(StoreError::not_found(id));
                }
            }

            let now = Utc::now();
            for row in inner.events.iter_mut() {
                if row.organization_id == organization_id
                    && event_ids.contains(&row.id)
                    && row.deleted_at.is_none()
                {
                    row.deleted_at = Some(now);
                }
            }
            Ok(event_ids.len())
        })
    }
}

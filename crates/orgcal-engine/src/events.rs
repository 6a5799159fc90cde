//! Adapter for direct organization events.
//!
//! Normalizes [`OrgEventRow`]s: scopes ids with the `event:` prefix, turns
//! row attributes into badges, and keeps the raw row id on the event so
//! clients can address it in delete calls. The only source whose events
//! are mutable through the API.

use std::sync::Arc;

use orgcal_core::{SourceKind, UnifiedEvent};
use orgcal_store::{BoxFuture, CalendarStore, OrgEventRow};

use crate::adapter::{FetchContext, SourceAdapter};
use crate::error::{AdapterError, AdapterResult};

const SOURCE_NAME: &str = "Organization events";

/// Serves the organization's own events.
pub struct EventAdapter {
    store: Arc<dyn CalendarStore>,
}

impl EventAdapter {
    /// Creates an adapter over the given store.
    pub fn new(store: Arc<dyn CalendarStore>) -> Self {
        Self { store }
    }
}

impl SourceAdapter for EventAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Event
    }

    fn fetch<'a>(
        &'a self,
        ctx: &'a FetchContext,
    ) -> BoxFuture<'a, AdapterResult<Vec<UnifiedEvent>>> {
        Box::pin(async move {
            let rows = self
                .store
                .org_events(&ctx.organization_id, ctx.window.end)
                .await?;

            let mut events = Vec::with_capacity(rows.len());
            for row in rows {
                if !ctx.window.overlaps(row.start_at, row.end_at) {
                    continue;
                }
                events.push(normalize(row)?);
            }
            Ok(events)
        })
    }
}

fn normalize(row: OrgEventRow) -> AdapterResult<UnifiedEvent> {
    if let Some(end_at) = row.end_at {
        if end_at < row.start_at {
            return Err(AdapterError::invalid_row(format!(
                "event {} ends before it starts",
                row.id
            )));
        }
    }

    let mut event = UnifiedEvent::new(
        SourceKind::Event,
        SourceKind::Event.scoped_id(&row.id),
        &row.title,
        row.start_at,
        SOURCE_NAME,
    )
    .with_all_day(row.all_day)
    .with_event_ref(&row.id);

    if let Some(end_at) = row.end_at {
        event = event.with_end(end_at);
    }
    if let Some(ref location) = row.location {
        event = event.with_location(location);
    }
    if let Some(ref event_type) = row.event_type {
        event = event.with_badge(event_type);
    }
    if row.is_philanthropy {
        event = event.with_badge("philanthropy");
    }
    if row.recurrence_group_id.is_some() {
        event = event.with_badge("recurring");
    }
    Ok(event)
}

//! Adapter for imported external schedules.
//!
//! Occurrences arrive pre-materialized, so this adapter only filters and
//! renames: cancelled occurrences are dropped, ids get the `schedule:`
//! prefix, and the schedule's label becomes the source name. Location text
//! is surfaced only when the backing store says its imports carry one.

use std::sync::Arc;

use orgcal_core::{SourceKind, UnifiedEvent};
use orgcal_store::{BoxFuture, CalendarStore, ImportedOccurrenceRow, OccurrenceStatus};

use crate::adapter::{FetchContext, SourceAdapter};
use crate::error::{AdapterError, AdapterResult};

/// Serves occurrences imported from external schedules.
pub struct ImportedScheduleAdapter {
    store: Arc<dyn CalendarStore>,
}

impl ImportedScheduleAdapter {
    /// Creates an adapter over the given store.
    pub fn new(store: Arc<dyn CalendarStore>) -> Self {
        Self { store }
    }
}

impl SourceAdapter for ImportedScheduleAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Schedule
    }

    fn fetch<'a>(
        &'a self,
        ctx: &'a FetchContext,
    ) -> BoxFuture<'a, AdapterResult<Vec<UnifiedEvent>>> {
        Box::pin(async move {
            let rows = self
                .store
                .imported_occurrences(&ctx.organization_id, ctx.window.end)
                .await?;
            let with_location = self.store.capabilities().imported_location;

            let mut events = Vec::with_capacity(rows.len());
            for row in rows {
                if row.status == OccurrenceStatus::Cancelled {
                    continue;
                }
                if !ctx.window.overlaps(row.start_at, Some(row.end_at)) {
                    continue;
                }
                events.push(normalize(row, with_location)?);
            }
            Ok(events)
        })
    }
}

fn normalize(row: ImportedOccurrenceRow, with_location: bool) -> AdapterResult<UnifiedEvent> {
    if row.end_at < row.start_at {
        return Err(AdapterError::invalid_row(format!(
            "occurrence {} ends before it starts",
            row.id
        )));
    }

    let mut event = UnifiedEvent::new(
        SourceKind::Schedule,
        SourceKind::Schedule.scoped_id(&row.id),
        &row.title,
        row.start_at,
        &row.source_label,
    )
    .with_end(row.end_at);

    if with_location {
        if let Some(ref location) = row.location {
            event = event.with_location(location);
        }
    }
    Ok(event)
}

//! Adapter for connected calendar feeds.
//!
//! Feed items pass through nearly unchanged: ids get the `feed:` prefix and
//! the feed's own name becomes the source name, falling back to the
//! provider's display name for unnamed connections. Which feeds are visible
//! (the organization's plus the requesting member's own) is the store's
//! concern; this adapter just forwards both scope ids.

use std::sync::Arc;

use orgcal_core::{SourceKind, UnifiedEvent};
use orgcal_store::{BoxFuture, CalendarStore, FeedItemRow};

use crate::adapter::{FetchContext, SourceAdapter};
use crate::error::{AdapterError, AdapterResult};

/// Serves items from connected calendar feeds.
pub struct FeedAdapter {
    store: Arc<dyn CalendarStore>,
}

impl FeedAdapter {
    /// Creates an adapter over the given store.
    pub fn new(store: Arc<dyn CalendarStore>) -> Self {
        Self { store }
    }
}

impl SourceAdapter for FeedAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Feed
    }

    fn fetch<'a>(
        &'a self,
        ctx: &'a FetchContext,
    ) -> BoxFuture<'a, AdapterResult<Vec<UnifiedEvent>>> {
        Box::pin(async move {
            let rows = self
                .store
                .feed_items(&ctx.organization_id, &ctx.user_id, ctx.window.end)
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

fn normalize(row: FeedItemRow) -> AdapterResult<UnifiedEvent> {
    if let Some(end_at) = row.end_at {
        if end_at < row.start_at {
            return Err(AdapterError::invalid_row(format!(
                "feed item {} ends before it starts",
                row.id
            )));
        }
    }

    let source_name = row
        .feed_name
        .clone()
        .unwrap_or_else(|| row.provider.display_name().to_string());

    let mut event = UnifiedEvent::new(
        SourceKind::Feed,
        SourceKind::Feed.scoped_id(&row.id),
        &row.title,
        row.start_at,
        source_name,
    )
    .with_all_day(row.all_day);

    if let Some(end_at) = row.end_at {
        event = event.with_end(end_at);
    }
    if let Some(ref location) = row.location {
        event = event.with_location(location);
    }
    Ok(event)
}

//! The timeline aggregator: fan out to adapters, merge, sort, paginate.
//!
//! [`TimelineEngine`] holds the registered adapters in canonical order
//! (events, schedules, feeds, classes). One [`timeline`] call validates the
//! window, runs every selected adapter concurrently under its own time
//! budget, concatenates whatever succeeded, stable-sorts by start instant,
//! and slices the requested page.
//!
//! Two aggregation rules are deliberate and load-bearing:
//!
//! - Failed adapters cost only their own source. The response is a plain
//!   200 page built from the sources that answered; nothing in the envelope
//!   flags the gap.
//! - No cross-source deduplication. An item mirrored by two sources appears
//!   twice, each under its own `sourceType`.
//!
//! [`timeline`]: TimelineEngine::timeline

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use orgcal_core::{
    SourceKind, UnifiedEvent, ValidatedWindow, WindowError, WindowLimits, WindowQuery,
};
use orgcal_store::CalendarStore;

use crate::adapter::{FetchContext, SourceAdapter};
use crate::classes::ClassScheduleAdapter;
use crate::error::AdapterError;
use crate::events::EventAdapter;
use crate::feeds::FeedAdapter;
use crate::schedules::ImportedScheduleAdapter;

/// Default per-adapter time budget.
pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(10);

/// One timeline request, before validation.
#[derive(Debug, Clone)]
pub struct TimelineRequest {
    /// Organization whose timeline is being read.
    pub organization_id: String,
    /// Requesting member; scopes personal sources.
    pub user_id: String,
    /// Raw window and pagination input.
    pub window: WindowQuery,
    /// Requested source subset; `None` selects every registered source.
    pub sources: Option<BTreeSet<SourceKind>>,
}

impl TimelineRequest {
    /// Creates a request selecting all sources.
    pub fn new(
        organization_id: impl Into<String>,
        user_id: impl Into<String>,
        window: WindowQuery,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            user_id: user_id.into(),
            window,
            sources: None,
        }
    }

    /// Builder: restrict the request to the given sources.
    pub fn with_sources(mut self, sources: impl IntoIterator<Item = SourceKind>) -> Self {
        self.sources = Some(sources.into_iter().collect());
        self
    }

    fn selects(&self, kind: SourceKind) -> bool {
        match self.sources {
            Some(ref sources) => sources.contains(&kind),
            None => true,
        }
    }
}

/// Pagination accounting for one timeline page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Events on this page.
    pub count: usize,
    /// Events across all pages of this request.
    pub total: usize,
    /// The page served, 1-based.
    pub page: usize,
    /// The page size used after clamping.
    pub limit: usize,
    /// Whether later pages exist.
    pub has_more: bool,
    /// Whether the full result set exceeds the hard response ceiling.
    pub truncated: bool,
}

/// The timeline response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePage {
    /// The page's events, sorted by start instant ascending.
    pub events: Vec<UnifiedEvent>,
    /// Pagination accounting.
    pub meta: PageMeta,
}

/// Merges calendar sources into one paginated, time-ordered view.
pub struct TimelineEngine {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    limits: WindowLimits,
    adapter_timeout: Duration,
}

impl TimelineEngine {
    /// Creates an engine over the given adapters. Registration order is the
    /// tie-break order for events starting at the same instant.
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self {
            adapters,
            limits: WindowLimits::default(),
            adapter_timeout: DEFAULT_ADAPTER_TIMEOUT,
        }
    }

    /// Creates an engine with the four standard adapters over one store,
    /// expanding class schedules in the given timezone.
    pub fn for_store<Tz>(store: Arc<dyn CalendarStore>, tz: Tz) -> Self
    where
        Tz: TimeZone + Send + Sync + 'static,
    {
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
            Arc::new(EventAdapter::new(Arc::clone(&store))),
            Arc::new(ImportedScheduleAdapter::new(Arc::clone(&store))),
            Arc::new(FeedAdapter::new(Arc::clone(&store))),
            Arc::new(ClassScheduleAdapter::new(store, tz)),
        ];
        Self::new(adapters)
    }

    /// Builder: set the window limits.
    pub fn with_limits(mut self, limits: WindowLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Builder: set the per-adapter time budget.
    pub fn with_adapter_timeout(mut self, timeout: Duration) -> Self {
        self.adapter_timeout = timeout;
        self
    }

    /// Assembles one timeline page.
    ///
    /// Fails only on window validation; adapter failures are logged and
    /// absorbed as empty contributions.
    #[tracing::instrument(
        skip(self, request),
        fields(org = %request.organization_id, user = %request.user_id)
    )]
    pub async fn timeline(&self, request: &TimelineRequest) -> Result<TimelinePage, WindowError> {
        let start = std::time::Instant::now();
        let selected: Vec<&Arc<dyn SourceAdapter>> = self
            .adapters
            .iter()
            .filter(|adapter| request.selects(adapter.kind()))
            .collect();

        let validated = request.window.validate(&self.limits, selected.len())?;
        let ctx = FetchContext::new(
            &request.organization_id,
            &request.user_id,
            validated.window.clone(),
        );

        let mut handles = Vec::with_capacity(selected.len());
        for adapter in selected {
            let adapter = Arc::clone(adapter);
            let ctx = ctx.clone();
            let budget = self.adapter_timeout;
            let kind = adapter.kind();
            let handle =
                tokio::spawn(
                    async move { tokio::time::timeout(budget, adapter.fetch(&ctx)).await },
                );
            handles.push((kind, handle));
        }

        let mut merged: Vec<UnifiedEvent> = Vec::new();
        for (kind, handle) in handles {
            let result = match handle.await {
                Ok(Ok(result)) => result,
                Ok(Err(_elapsed)) => Err(AdapterError::timeout(format!(
                    "no answer within {}s",
                    self.adapter_timeout.as_secs()
                ))),
                Err(join_err) => {
                    Err(AdapterError::internal(format!("source task failed: {join_err}")))
                }
            };
            match result {
                Ok(events) => {
                    debug!(source = %kind, count = events.len(), "source contributed");
                    merged.extend(events);
                }
                Err(err) => {
                    warn!(source = %kind, code = %err.code(), error = %err, "source skipped");
                }
            }
        }

        // Stable sort: equal instants keep concatenation order, which is
        // adapter registration order
        merged.sort_by_key(|event| event.start_at);

        let page = paginate(merged, &validated, &self.limits);
        debug!(
            total = page.meta.total,
            count = page.meta.count,
            truncated = page.meta.truncated,
            duration_ms = start.elapsed().as_millis(),
            "timeline assembled"
        );
        Ok(page)
    }
}

fn paginate(
    events: Vec<UnifiedEvent>,
    validated: &ValidatedWindow,
    limits: &WindowLimits,
) -> TimelinePage {
    let total = events.len();
    let truncated = total > limits.max_events;
    let page_events: Vec<UnifiedEvent> = events
        .into_iter()
        .skip(validated.offset)
        .take(validated.limit)
        .collect();
    let count = page_events.len();

    TimelinePage {
        events: page_events,
        meta: PageMeta {
            count,
            total,
            page: validated.page,
            limit: validated.limit,
            has_more: validated.offset + count < total,
            truncated,
        },
    }
}

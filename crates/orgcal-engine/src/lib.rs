//! Timeline assembly: adapters, recurrence expansion, aggregation, deletes.
//!
//! This crate turns the four stored calendar sources into one paginated,
//! time-ordered view:
//!
//! - [`SourceAdapter`] - One implementation per source, fetching and
//!   normalizing into [`UnifiedEvent`](orgcal_core::UnifiedEvent)s
//! - [`expand_rule`] - Pure recurrence expansion for class schedules
//! - [`TimelineEngine`] - Concurrent fan-out, merge, sort, paginate
//! - [`SeriesResolver`] - Recurrence-scoped deletion of direct events
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐ ┌─────────────┐ ┌────────────┐ ┌──────────────┐
//! │ org events │ │ imports     │ │ feed items │ │ class rules  │
//! └─────┬──────┘ └──────┬──────┘ └─────┬──────┘ └──────┬───────┘
//!       │               │              │               │ expand_rule()
//!       ▼               ▼              ▼               ▼
//! ┌────────────┐ ┌─────────────┐ ┌────────────┐ ┌──────────────┐
//! │EventAdapter│ │ImportedSched│ │FeedAdapter │ │ClassSchedule │
//! │            │ │uleAdapter   │ │            │ │Adapter       │
//! └─────┬──────┘ └──────┬──────┘ └─────┬──────┘ └──────┬───────┘
//!       │               │              │               │
//!       └───────────────┴──────┬───────┴───────────────┘
//!                              │ SourceAdapter
//!                              ▼
//!                      ┌───────────────┐
//!                      │TimelineEngine │  merge, sort, paginate
//!                      └───────┬───────┘
//!                              │
//!                              ▼
//!                      ┌───────────────┐
//!                      │ TimelinePage  │
//!                      └───────────────┘
//! ```

pub mod adapter;
pub mod aggregate;
pub mod classes;
pub mod error;
pub mod events;
pub mod expand;
pub mod feeds;
pub mod schedules;
pub mod series;

// Re-export main types at crate root
pub use adapter::{ErrorAdapter, FetchContext, SourceAdapter};
pub use aggregate::{
    DEFAULT_ADAPTER_TIMEOUT, PageMeta, TimelineEngine, TimelinePage, TimelineRequest,
};
pub use classes::ClassScheduleAdapter;
pub use error::{AdapterError, AdapterErrorCode, AdapterResult, ResolverError, ResolverResult};
pub use events::EventAdapter;
pub use expand::expand_rule;
pub use feeds::FeedAdapter;
pub use schedules::ImportedScheduleAdapter;
pub use series::{DeleteScope, SeriesResolver};

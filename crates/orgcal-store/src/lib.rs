//! Storage layer for orgcal.
//!
//! This crate defines the source records the timeline engine reads
//! ([`OrgEventRow`], [`ImportedOccurrenceRow`], [`FeedItemRow`],
//! [`ClassScheduleRow`]), the async [`CalendarStore`] trait every backend
//! implements, and [`MemoryStore`], the in-memory backend used by the
//! server's seed mode and by tests.
//!
//! Store reads are deliberately coarse: they may return a superset of the
//! requested window (for example by filtering on an upper bound only), and
//! callers apply the precise overlap predicate themselves.

pub mod memory;
pub mod rows;
pub mod store;

pub use memory::{MemoryStore, StoreSnapshot};
pub use rows::{
    ClassScheduleRow, FeedItemRow, FeedProvider, ImportedOccurrenceRow, OccurrencePattern,
    OccurrenceStatus, OrgEventRow,
};
pub use store::{BoxFuture, CalendarStore, StoreCapabilities, StoreError, StoreResult};

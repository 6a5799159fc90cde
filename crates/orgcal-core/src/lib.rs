//! Core types: unified events, time windows, query validation, tracing setup

pub mod event;
pub mod time;
pub mod tracing;

pub use event::{SourceKind, UnifiedEvent, occurrence_id};
pub use time::{
    MAX_EVENTS, TimeWindow, ValidatedWindow, WindowError, WindowLimits, WindowQuery,
};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};

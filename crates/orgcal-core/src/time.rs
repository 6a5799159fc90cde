//! Time windows and query validation.
//!
//! This module provides [`TimeWindow`], the caller-supplied instant range a
//! timeline request covers, and [`WindowQuery`], the raw query input that is
//! validated and clamped into a [`ValidatedWindow`].
//!
//! `TimeWindow::overlaps` is the one canonical overlap predicate for the
//! whole engine. Storage reads are allowed to return a coarser superset
//! (typically filtered only by an upper bound); adapters re-apply this
//! predicate in-process after every fetch.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard ceiling on events returned in one response.
///
/// Also the default and maximum page size. Independent of pagination: a
/// request whose full result set exceeds this is reported as truncated.
pub const MAX_EVENTS: usize = 500;

/// Errors produced by window validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WindowError {
    /// A bound failed to parse, or the bounds are reversed.
    #[error("invalid time window: {reason}")]
    Invalid { reason: String },

    /// The window spans more days than the configured maximum.
    #[error("time window spans {days} days, maximum is {max}")]
    TooLarge { days: i64, max: i64 },
}

impl WindowError {
    /// Creates an invalid-window error.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }

    /// Returns the machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Invalid { .. } => "invalid_window",
            Self::TooLarge { .. } => "window_too_large",
        }
    }
}

/// A query time window, as a closed instant range `[start, end]` in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (inclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`. Callers handling untrusted input
    /// go through [`WindowQuery::validate`] instead.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Returns the duration of this window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if an instant falls within this window (closed bounds).
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt <= self.end
    }

    /// The canonical overlap predicate.
    ///
    /// An item intersects the window iff it starts at-or-before the window
    /// end and, when it has an end, ends at-or-after the window start. An
    /// item with no end is treated as a point event: its start must itself
    /// fall at-or-after the window start, otherwise an endless item far in
    /// the past would cover every future window.
    pub fn overlaps(&self, item_start: DateTime<Utc>, item_end: Option<DateTime<Utc>>) -> bool {
        if item_start > self.end {
            return false;
        }
        match item_end {
            Some(end) => end >= self.start,
            None => item_start >= self.start,
        }
    }

    /// Returns the window bounds as calendar dates in the given timezone.
    ///
    /// This is the only sanctioned instant-to-date conversion; recurrence
    /// expansion works on the dates it yields, never on the instants.
    pub fn local_date_span<Tz: TimeZone>(&self, tz: &Tz) -> (NaiveDate, NaiveDate) {
        (
            self.start.with_timezone(tz).date_naive(),
            self.end.with_timezone(tz).date_naive(),
        )
    }
}

/// Span and size policy applied during window validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLimits {
    /// Maximum span in days for the full aggregator.
    pub max_span_days: i64,
    /// Tighter span bound applied when exactly one source is selected.
    pub single_source_span_days: i64,
    /// Page size ceiling and response hard cap.
    pub max_events: usize,
}

impl Default for WindowLimits {
    fn default() -> Self {
        Self {
            max_span_days: 400,
            single_source_span_days: 365,
            max_events: MAX_EVENTS,
        }
    }
}

impl WindowLimits {
    /// Builder: set the full-aggregator span bound.
    pub fn with_max_span_days(mut self, days: i64) -> Self {
        self.max_span_days = days;
        self
    }

    /// Builder: set the single-source span bound.
    pub fn with_single_source_span_days(mut self, days: i64) -> Self {
        self.single_source_span_days = days;
        self
    }

    /// Builder: set the page size ceiling.
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Returns the span bound applying to a request selecting
    /// `source_count` sources.
    pub fn span_days_for(&self, source_count: usize) -> i64 {
        if source_count == 1 {
            self.single_source_span_days
        } else {
            self.max_span_days
        }
    }
}

/// Raw window and pagination input, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindowQuery {
    /// Window start, an RFC 3339 instant string.
    pub start: String,
    /// Window end, an RFC 3339 instant string.
    pub end: String,
    /// Requested page, 1-based.
    pub page: Option<i64>,
    /// Requested page size.
    pub limit: Option<i64>,
}

impl WindowQuery {
    /// Creates a query from the two window bounds.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            page: None,
            limit: None,
        }
    }

    /// Builder: set the requested page.
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    /// Builder: set the requested page size.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Validates the query against the given limits.
    ///
    /// Fails when a bound does not parse, the bounds are reversed, or the
    /// span exceeds the bound for `source_count` selected sources.
    /// Out-of-range pagination values are clamped, not rejected: `page`
    /// to at least 1, `limit` into `[1, max_events]`.
    pub fn validate(
        &self,
        limits: &WindowLimits,
        source_count: usize,
    ) -> Result<ValidatedWindow, WindowError> {
        let start = parse_instant("start", &self.start)?;
        let end = parse_instant("end", &self.end)?;
        if start > end {
            return Err(WindowError::invalid("start is after end"));
        }

        let max_days = limits.span_days_for(source_count);
        let span = end - start;
        if span > Duration::days(max_days) {
            return Err(WindowError::TooLarge {
                days: span.num_days(),
                max: max_days,
            });
        }

        let page = self.page.unwrap_or(1).max(1) as usize;
        let limit = self.limit.unwrap_or(limits.max_events as i64);
        let limit = limit.clamp(1, limits.max_events as i64) as usize;
        let offset = (page - 1).saturating_mul(limit);

        Ok(ValidatedWindow {
            window: TimeWindow { start, end },
            page,
            limit,
            offset,
        })
    }
}

fn parse_instant(field: &str, raw: &str) -> Result<DateTime<Utc>, WindowError> {
    if raw.is_empty() {
        return Err(WindowError::invalid(format!("{field} is required")));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| WindowError::invalid(format!("{field} is not a valid instant: {err}")))
}

/// A validated window with normalized pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedWindow {
    /// The parsed window.
    pub window: TimeWindow,
    /// Normalized page, always >= 1.
    pub page: usize,
    /// Normalized page size, within `[1, max_events]`.
    pub limit: usize,
    /// Items to skip: `(page - 1) * limit`.
    pub offset: usize,
}

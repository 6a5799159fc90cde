//! Unified event types.
//!
//! This module provides the common shape all calendar sources are projected
//! into before merging:
//! - [`UnifiedEvent`]: the normalized, output-only event representation
//! - [`SourceKind`]: which of the four sources an event originated from
//!
//! Unified events are assembled per request and never persisted; adapters
//! build them fresh from source rows on every aggregation call.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The source a unified event was projected from.
///
/// The serialized form (`event`, `schedule`, `feed`, `class`) doubles as the
/// id namespace prefix, which keeps ids globally unique across sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A direct organization event.
    Event,
    /// An occurrence imported from an external schedule.
    Schedule,
    /// An item from a connected calendar feed (ICS, Google).
    Feed,
    /// An occurrence expanded from an academic schedule rule.
    Class,
}

impl SourceKind {
    /// All four kinds, in aggregator registration order.
    pub const ALL: [SourceKind; 4] = [Self::Event, Self::Schedule, Self::Feed, Self::Class];

    /// Returns the serialized name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Schedule => "schedule",
            Self::Feed => "feed",
            Self::Class => "class",
        }
    }

    /// Returns the plural token used in the `sources` query parameter.
    pub fn query_token(&self) -> &'static str {
        match self {
            Self::Event => "events",
            Self::Schedule => "schedules",
            Self::Feed => "feeds",
            Self::Class => "classes",
        }
    }

    /// Parses a `sources` query token (e.g. `"feeds"`).
    pub fn from_query_token(token: &str) -> Option<Self> {
        match token {
            "events" => Some(Self::Event),
            "schedules" => Some(Self::Schedule),
            "feeds" => Some(Self::Feed),
            "classes" => Some(Self::Class),
            _ => None,
        }
    }

    /// Builds the namespaced unified id for a row of this source.
    pub fn scoped_id(&self, raw_id: &str) -> String {
        format!("{}:{}", self.as_str(), raw_id)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Builds the id of one expanded class occurrence.
///
/// The local date keeps occurrence identity stable across repeated
/// expansions of the same rule.
pub fn occurrence_id(rule_id: &str, date: NaiveDate) -> String {
    format!("class:{}:{}", rule_id, date.format("%Y-%m-%d"))
}

/// A normalized calendar event from any source.
///
/// This is the canonical shape the aggregator merges, sorts and serializes.
/// Instants are UTC; `end_at` is absent for feed items without an explicit
/// end. Construction is the only mutation point; once built, an event is
/// carried through the pipeline unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedEvent {
    /// Namespaced identifier, unique across all sources.
    pub id: String,
    /// The event title.
    pub title: String,
    /// When the event starts.
    pub start_at: DateTime<Utc>,
    /// When the event ends, if known. Must not precede `start_at`.
    pub end_at: Option<DateTime<Utc>>,
    /// Whether this is an all-day event.
    pub all_day: bool,
    /// Free-form location, if any.
    pub location: Option<String>,
    /// The source this event was projected from.
    pub source_type: SourceKind,
    /// Human label of the originating integration or source.
    pub source_name: String,
    /// Free-form tags (e.g. "recurring", "philanthropy").
    pub badges: BTreeSet<String>,
    /// Back-reference to the originating row. Present only for
    /// [`SourceKind::Event`], where it feeds recurrence-scoped deletion.
    pub event_id: Option<String>,
}

impl UnifiedEvent {
    /// Creates a new UnifiedEvent with required fields.
    pub fn new(
        source_type: SourceKind,
        id: impl Into<String>,
        title: impl Into<String>,
        start_at: DateTime<Utc>,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start_at,
            end_at: None,
            all_day: false,
            location: None,
            source_type,
            source_name: source_name.into(),
            badges: BTreeSet::new(),
            event_id: None,
        }
    }

    /// Builder method to set the end instant.
    pub fn with_end(mut self, end_at: DateTime<Utc>) -> Self {
        self.end_at = Some(end_at);
        self
    }

    /// Builder method to mark as all-day.
    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to add a badge.
    pub fn with_badge(mut self, badge: impl Into<String>) -> Self {
        self.badges.insert(badge.into());
        self
    }

    /// Builder method to set the originating row reference.
    pub fn with_event_ref(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    /// Returns true if the event carries a given badge.
    pub fn has_badge(&self, badge: &str) -> bool {
        self.badges.contains(badge)
    }

    /// Returns the duration in minutes, if the end is known.
    pub fn duration_minutes(&self) -> Option<i64> {
        self.end_at.map(|end| (end - self.start_at).num_minutes())
    }
}

//! Source records as they exist in storage.
//!
//! One record type per calendar source:
//!
//! - [`OrgEventRow`]: events created directly in an organization
//! - [`ImportedOccurrenceRow`]: occurrences materialized from imported
//!   external schedules
//! - [`FeedItemRow`]: items pulled from connected calendar feeds
//! - [`ClassScheduleRow`]: recurrence rules for personal class schedules,
//!   expanded into occurrences at read time
//!
//! These are storage shapes, not wire shapes. The engine normalizes each of
//! them into a unified event before anything leaves the process.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// An event created directly in an organization's calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgEventRow {
    /// Storage identifier, unique within the source.
    pub id: String,
    /// Owning organization.
    pub organization_id: String,
    /// Display title.
    pub title: String,
    /// Start instant (UTC).
    pub start_at: DateTime<Utc>,
    /// End instant, absent for events with no scheduled end.
    pub end_at: Option<DateTime<Utc>>,
    /// Whether the event covers whole days.
    #[serde(default)]
    pub all_day: bool,
    /// Free-form location text.
    pub location: Option<String>,
    /// Organization-defined category, surfaced as a badge.
    pub event_type: Option<String>,
    /// Whether the event counts toward philanthropy requirements.
    #[serde(default)]
    pub is_philanthropy: bool,
    /// Links occurrences of the same recurring event.
    pub recurrence_group_id: Option<String>,
    /// Soft-deletion marker. Deleted rows never reach the timeline.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl OrgEventRow {
    /// Creates a minimal event row.
    pub fn new(
        id: impl Into<String>,
        organization_id: impl Into<String>,
        title: impl Into<String>,
        start_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            organization_id: organization_id.into(),
            title: title.into(),
            start_at,
            end_at: None,
            all_day: false,
            location: None,
            event_type: None,
            is_philanthropy: false,
            recurrence_group_id: None,
            deleted_at: None,
        }
    }

    /// Builder: set the end instant.
    pub fn with_end(mut self, end_at: DateTime<Utc>) -> Self {
        self.end_at = Some(end_at);
        self
    }

    /// Builder: mark as an all-day event.
    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    /// Builder: set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder: set the organization-defined category.
    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Builder: mark as a philanthropy event.
    pub fn with_philanthropy(mut self, is_philanthropy: bool) -> Self {
        self.is_philanthropy = is_philanthropy;
        self
    }

    /// Builder: attach to a recurrence series.
    pub fn with_recurrence_group(mut self, group_id: impl Into<String>) -> Self {
        self.recurrence_group_id = Some(group_id.into());
        self
    }

    /// Whether this row has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Lifecycle state of an imported occurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceStatus {
    /// Will happen as planned.
    #[default]
    Scheduled,
    /// Cancelled upstream; excluded from the timeline.
    Cancelled,
}

/// One occurrence materialized from an imported external schedule.
///
/// Imports are flattened at import time, so unlike class schedules there is
/// no rule to expand and both instants are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedOccurrenceRow {
    /// Storage identifier, unique within the source.
    pub id: String,
    /// Owning organization.
    pub organization_id: String,
    /// Name of the schedule this occurrence was imported from.
    pub source_label: String,
    /// Display title.
    pub title: String,
    /// Start instant (UTC).
    pub start_at: DateTime<Utc>,
    /// End instant (UTC), always known for imports.
    pub end_at: DateTime<Utc>,
    /// Free-form location text.
    pub location: Option<String>,
    /// Lifecycle state.
    #[serde(default)]
    pub status: OccurrenceStatus,
}

impl ImportedOccurrenceRow {
    /// Creates a scheduled occurrence.
    pub fn new(
        id: impl Into<String>,
        organization_id: impl Into<String>,
        source_label: impl Into<String>,
        title: impl Into<String>,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            organization_id: organization_id.into(),
            source_label: source_label.into(),
            title: title.into(),
            start_at,
            end_at,
            location: None,
            status: OccurrenceStatus::Scheduled,
        }
    }

    /// Builder: set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder: set the lifecycle state.
    pub fn with_status(mut self, status: OccurrenceStatus) -> Self {
        self.status = status;
        self
    }
}

/// Upstream system a calendar feed connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedProvider {
    /// A subscribed iCalendar URL.
    Ics,
    /// A linked Google Calendar.
    Google,
}

impl FeedProvider {
    /// Human-readable name, used when a feed has no name of its own.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ics => "ICS feed",
            Self::Google => "Google Calendar",
        }
    }
}

/// One item from a connected calendar feed.
///
/// A feed belongs to an organization or to an individual user; the two
/// owner fields express that, and visibility rules key off them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItemRow {
    /// Storage identifier, unique within the source.
    pub id: String,
    /// Owning organization, for org-level feeds.
    pub organization_id: Option<String>,
    /// Owning user, for personal feeds.
    pub owner_user_id: Option<String>,
    /// Upstream system.
    pub provider: FeedProvider,
    /// Feed display name, when the user gave the connection one.
    pub feed_name: Option<String>,
    /// Display title.
    pub title: String,
    /// Start instant (UTC).
    pub start_at: DateTime<Utc>,
    /// End instant, absent when the upstream item has none.
    pub end_at: Option<DateTime<Utc>>,
    /// Whether the item covers whole days.
    #[serde(default)]
    pub all_day: bool,
    /// Free-form location text.
    pub location: Option<String>,
}

impl FeedItemRow {
    /// Creates an unowned feed item; attach an owner with
    /// [`for_organization`](Self::for_organization) or
    /// [`for_user`](Self::for_user).
    pub fn new(
        id: impl Into<String>,
        provider: FeedProvider,
        title: impl Into<String>,
        start_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            organization_id: None,
            owner_user_id: None,
            provider,
            feed_name: None,
            title: title.into(),
            start_at,
            end_at: None,
            all_day: false,
            location: None,
        }
    }

    /// Builder: own the feed at the organization level.
    pub fn for_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// Builder: own the feed at the user level.
    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.owner_user_id = Some(user_id.into());
        self
    }

    /// Builder: set the feed display name.
    pub fn with_feed_name(mut self, name: impl Into<String>) -> Self {
        self.feed_name = Some(name.into());
        self
    }

    /// Builder: set the end instant.
    pub fn with_end(mut self, end_at: DateTime<Utc>) -> Self {
        self.end_at = Some(end_at);
        self
    }

    /// Builder: mark as an all-day item.
    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    /// Builder: set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// How a class schedule rule repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrencePattern {
    /// Exactly one occurrence, on the rule's start date.
    Single,
    /// Every day between the rule's bounds.
    Daily,
    /// On listed weekdays between the rule's bounds.
    Weekly,
    /// On one day of the month between the rule's bounds.
    Monthly,
}

/// A recurrence rule for a member's class schedule.
///
/// Dates and times are stored in the organization's local calendar, not as
/// instants; the engine combines them with a timezone when expanding.
/// `days_of_week` uses 0 for Sunday through 6 for Saturday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassScheduleRow {
    /// Storage identifier, unique within the source.
    pub id: String,
    /// Owning organization.
    pub organization_id: String,
    /// Member the schedule belongs to.
    pub user_id: String,
    /// Display title, typically the course name.
    pub title: String,
    /// First local date the rule is active.
    pub start_date: NaiveDate,
    /// Last local date the rule is active, absent for open-ended rules.
    pub end_date: Option<NaiveDate>,
    /// Local wall-clock start time of each occurrence.
    pub start_time: NaiveTime,
    /// Local wall-clock end time of each occurrence.
    pub end_time: NaiveTime,
    /// Repetition pattern.
    pub pattern: OccurrencePattern,
    /// Weekdays the rule fires on, for weekly rules. 0 = Sunday.
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    /// Day of month the rule fires on, for monthly rules.
    pub day_of_month: Option<u8>,
    /// Free-form location text.
    pub location: Option<String>,
    /// Soft-deletion marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ClassScheduleRow {
    /// Creates a rule with the given pattern and no recurrence details.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        organization_id: impl Into<String>,
        user_id: impl Into<String>,
        title: impl Into<String>,
        start_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        pattern: OccurrencePattern,
    ) -> Self {
        Self {
            id: id.into(),
            organization_id: organization_id.into(),
            user_id: user_id.into(),
            title: title.into(),
            start_date,
            end_date: None,
            start_time,
            end_time,
            pattern,
            days_of_week: Vec::new(),
            day_of_month: None,
            location: None,
            deleted_at: None,
        }
    }

    /// Builder: bound the rule with a last active date.
    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Builder: set the weekdays a weekly rule fires on (0 = Sunday).
    pub fn with_days_of_week(mut self, days: impl Into<Vec<u8>>) -> Self {
        self.days_of_week = days.into();
        self
    }

    /// Builder: set the day of month a monthly rule fires on.
    pub fn with_day_of_month(mut self, day: u8) -> Self {
        self.day_of_month = Some(day);
        self
    }

    /// Builder: set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Whether this rule has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

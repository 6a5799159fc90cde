//! Adapter for class schedules, wrapping the recurrence expander.
//!
//! Fetches the requesting member's rules, validates each against its own
//! pattern, and expands them in the engine's timezone. Window membership
//! for expanded occurrences is judged on local dates by the expander, not
//! re-checked on instants here.

use std::sync::Arc;

use chrono::TimeZone;

use orgcal_core::{SourceKind, UnifiedEvent};
use orgcal_store::{BoxFuture, CalendarStore, ClassScheduleRow, OccurrencePattern};

use crate::adapter::{FetchContext, SourceAdapter};
use crate::error::{AdapterError, AdapterResult};
use crate::expand::expand_rule;

/// Serves occurrences expanded from class schedule rules.
pub struct ClassScheduleAdapter<Tz> {
    store: Arc<dyn CalendarStore>,
    tz: Tz,
}

impl<Tz> ClassScheduleAdapter<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
{
    /// Creates an adapter expanding rules in the given timezone.
    pub fn new(store: Arc<dyn CalendarStore>, tz: Tz) -> Self {
        Self { store, tz }
    }
}

impl<Tz> SourceAdapter for ClassScheduleAdapter<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
{
    fn kind(&self) -> SourceKind {
        SourceKind::Class
    }

    fn fetch<'a>(
        &'a self,
        ctx: &'a FetchContext,
    ) -> BoxFuture<'a, AdapterResult<Vec<UnifiedEvent>>> {
        Box::pin(async move {
            let rules = self
                .store
                .class_schedules(&ctx.organization_id, &ctx.user_id)
                .await?;

            let mut events = Vec::new();
            for rule in &rules {
                validate_rule(rule)?;
                events.extend(expand_rule(rule, &ctx.window, &self.tz));
            }
            Ok(events)
        })
    }
}

fn validate_rule(rule: &ClassScheduleRow) -> AdapterResult<()> {
    if rule.end_time < rule.start_time {
        return Err(AdapterError::invalid_row(format!(
            "schedule {} ends before it starts",
            rule.id
        )));
    }
    match rule.pattern {
        OccurrencePattern::Weekly => {
            if rule.days_of_week.iter().any(|day| *day > 6) {
                return Err(AdapterError::invalid_row(format!(
                    "schedule {} has a weekday outside 0..=6",
                    rule.id
                )));
            }
        }
        OccurrencePattern::Monthly => match rule.day_of_month {
            None => {
                return Err(AdapterError::invalid_row(format!(
                    "monthly schedule {} has no day of month",
                    rule.id
                )));
            }
            Some(day) if !(1..=31).contains(&day) => {
                return Err(AdapterError::invalid_row(format!(
                    "schedule {} has day of month {day} outside 1..=31",
                    rule.id
                )));
            }
            Some(_) => {}
        },
        OccurrencePattern::Single | OccurrencePattern::Daily => {}
    }
    Ok(())
}

//! Recurrence expansion for class schedule rules.
//!
//! [`expand_rule`] is a pure function from (rule, window, timezone) to the
//! concrete occurrences the rule produces inside the window.
//!
//! All range arithmetic here happens on **local calendar dates**, never on
//! instants. The window's instants are converted to local dates once, the
//! rule's own dates are already local, and only after a date is selected do
//! wall-clock times come in to build the occurrence instants. Parsing a bare
//! date as UTC midnight would shift every occurrence by a day for zones
//! behind UTC, which is exactly the failure this layout prevents.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};

use orgcal_core::{SourceKind, TimeWindow, UnifiedEvent, occurrence_id};
use orgcal_store::{ClassScheduleRow, OccurrencePattern};

/// Source name attached to every expanded occurrence.
const SOURCE_NAME: &str = "Class schedule";

/// Expands a rule into its occurrences within `window`.
///
/// The rule is assumed validated (sane times, weekday and day-of-month
/// fields matching its pattern); the adapter wrapping this function checks
/// that before calling. Occurrences are emitted in ascending date order.
pub fn expand_rule<Tz: TimeZone>(
    rule: &ClassScheduleRow,
    window: &TimeWindow,
    tz: &Tz,
) -> Vec<UnifiedEvent> {
    let (window_start, window_end) = window.local_date_span(tz);
    let effective_start = rule.start_date.max(window_start);
    let effective_end = match rule.end_date {
        Some(end) => end.min(window_end),
        None => window_end,
    };

    let dates: Vec<NaiveDate> = match rule.pattern {
        // A single rule fires on its start date or not at all; the clamped
        // range does not apply to it.
        OccurrencePattern::Single => {
            if rule.start_date >= window_start && rule.start_date <= window_end {
                vec![rule.start_date]
            } else {
                Vec::new()
            }
        }
        OccurrencePattern::Daily => dates_between(effective_start, effective_end).collect(),
        OccurrencePattern::Weekly => dates_between(effective_start, effective_end)
            .filter(|date| {
                let weekday = date.weekday().num_days_from_sunday() as u8;
                rule.days_of_week.contains(&weekday)
            })
            .collect(),
        // No roll-over: months without the requested day yield nothing
        OccurrencePattern::Monthly => dates_between(effective_start, effective_end)
            .filter(|date| Some(date.day() as u8) == rule.day_of_month)
            .collect(),
    };

    dates
        .into_iter()
        .filter_map(|date| occurrence_for(rule, date, tz))
        .collect()
}

fn dates_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |date| *date <= end)
}

fn occurrence_for<Tz: TimeZone>(
    rule: &ClassScheduleRow,
    date: NaiveDate,
    tz: &Tz,
) -> Option<UnifiedEvent> {
    let start_at = local_instant(date, rule.start_time, tz)?;
    let end_at = local_instant(date, rule.end_time, tz)?;

    let mut event = UnifiedEvent::new(
        SourceKind::Class,
        occurrence_id(&rule.id, date),
        &rule.title,
        start_at,
        SOURCE_NAME,
    )
    .with_end(end_at);
    if let Some(ref location) = rule.location {
        event = event.with_location(location);
    }
    Some(event)
}

/// Combines a local date and wall-clock time into a UTC instant.
///
/// Local times that do not exist (spring-forward gaps) have no mapping and
/// the occurrence is skipped; ambiguous times resolve to the earlier
/// instant.
fn local_instant<Tz: TimeZone>(date: NaiveDate, time: NaiveTime, tz: &Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn rule(pattern: OccurrencePattern) -> ClassScheduleRow {
        ClassScheduleRow::new(
            "cs-1",
            "org-1",
            "user-1",
            "CHEM 301",
            date(2026, 1, 12),
            time(9, 0),
            time(10, 0),
            pattern,
        )
    }

    fn window(start: DateTime<Utc>, end: DateTime<Utc>) -> TimeWindow {
        TimeWindow::new(start, end)
    }

    fn occurrence_dates(events: &[UnifiedEvent]) -> Vec<String> {
        events.iter().map(|e| e.id.clone()).collect()
    }

    mod weekly {
        use super::*;

        #[test]
        fn monday_wednesday_over_two_weeks_yields_four() {
            // 2026-03-02 is a Monday
            let rule = rule(OccurrencePattern::Weekly).with_days_of_week([1, 3]);
            let window = window(utc(2026, 3, 2, 0, 0, 0), utc(2026, 3, 15, 23, 59, 59));

            let events = expand_rule(&rule, &window, &Utc);
            assert_eq!(
                occurrence_dates(&events),
                vec![
                    "class:cs-1:2026-03-02",
                    "class:cs-1:2026-03-04",
                    "class:cs-1:2026-03-09",
                    "class:cs-1:2026-03-11",
                ]
            );
        }

        #[test]
        fn sunday_is_day_zero() {
            // 2026-03-01 is a Sunday
            let rule = rule(OccurrencePattern::Weekly).with_days_of_week([0]);
            let window = window(utc(2026, 3, 1, 0, 0, 0), utc(2026, 3, 7, 23, 59, 59));

            let events = expand_rule(&rule, &window, &Utc);
            assert_eq!(occurrence_dates(&events), vec!["class:cs-1:2026-03-01"]);
        }

        #[test]
        fn no_selected_weekdays_yields_nothing() {
            let rule = rule(OccurrencePattern::Weekly);
            let window = window(utc(2026, 3, 2, 0, 0, 0), utc(2026, 3, 15, 23, 59, 59));
            assert!(expand_rule(&rule, &window, &Utc).is_empty());
        }
    }

    mod monthly {
        use super::*;

        #[test]
        fn day_31_skips_february() {
            let rule = rule(OccurrencePattern::Monthly).with_day_of_month(31);
            let window = window(utc(2026, 2, 1, 0, 0, 0), utc(2026, 2, 28, 23, 59, 59));
            assert!(expand_rule(&rule, &window, &Utc).is_empty());
        }

        #[test]
        fn day_31_fires_only_in_long_months() {
            let rule = rule(OccurrencePattern::Monthly).with_day_of_month(31);
            let window = window(utc(2026, 1, 15, 0, 0, 0), utc(2026, 3, 15, 23, 59, 59));

            let events = expand_rule(&rule, &window, &Utc);
            assert_eq!(occurrence_dates(&events), vec!["class:cs-1:2026-01-31"]);
        }

        #[test]
        fn mid_month_day_fires_every_month() {
            let rule = rule(OccurrencePattern::Monthly).with_day_of_month(15);
            let window = window(utc(2026, 3, 1, 0, 0, 0), utc(2026, 4, 30, 23, 59, 59));

            let events = expand_rule(&rule, &window, &Utc);
            assert_eq!(
                occurrence_dates(&events),
                vec!["class:cs-1:2026-03-15", "class:cs-1:2026-04-15"]
            );
        }
    }

    mod daily {
        use super::*;

        #[test]
        fn fires_every_day_of_the_clamped_range() {
            let mut r = rule(OccurrencePattern::Daily);
            r.start_date = date(2026, 3, 4);
            let window = window(utc(2026, 3, 2, 0, 0, 0), utc(2026, 3, 6, 23, 59, 59));

            let events = expand_rule(&r, &window, &Utc);
            assert_eq!(
                occurrence_dates(&events),
                vec![
                    "class:cs-1:2026-03-04",
                    "class:cs-1:2026-03-05",
                    "class:cs-1:2026-03-06",
                ]
            );
        }

        #[test]
        fn rule_end_date_caps_the_range() {
            let r = rule(OccurrencePattern::Daily).with_end_date(date(2026, 3, 3));
            let window = window(utc(2026, 3, 2, 0, 0, 0), utc(2026, 3, 8, 23, 59, 59));

            let events = expand_rule(&r, &window, &Utc);
            assert_eq!(
                occurrence_dates(&events),
                vec!["class:cs-1:2026-03-02", "class:cs-1:2026-03-03"]
            );
        }

        #[test]
        fn rule_entirely_after_the_window_yields_nothing() {
            let mut r = rule(OccurrencePattern::Daily);
            r.start_date = date(2026, 6, 1);
            let window = window(utc(2026, 3, 2, 0, 0, 0), utc(2026, 3, 8, 23, 59, 59));
            assert!(expand_rule(&r, &window, &Utc).is_empty());
        }

        #[test]
        fn rule_entirely_before_the_window_yields_nothing() {
            let r = rule(OccurrencePattern::Daily).with_end_date(date(2026, 2, 1));
            let window = window(utc(2026, 3, 2, 0, 0, 0), utc(2026, 3, 8, 23, 59, 59));
            assert!(expand_rule(&r, &window, &Utc).is_empty());
        }
    }

    mod single {
        use super::*;

        #[test]
        fn fires_once_when_the_start_date_is_inside() {
            let mut r = rule(OccurrencePattern::Single);
            r.start_date = date(2026, 3, 5);
            let window = window(utc(2026, 3, 2, 0, 0, 0), utc(2026, 3, 8, 23, 59, 59));

            let events = expand_rule(&r, &window, &Utc);
            assert_eq!(occurrence_dates(&events), vec!["class:cs-1:2026-03-05"]);
        }

        #[test]
        fn ignores_the_clamped_range_when_the_start_date_is_outside() {
            // The clamped range [window start, rule end] is non-empty, but a
            // single rule keys off its start date alone.
            let mut r = rule(OccurrencePattern::Single).with_end_date(date(2026, 3, 20));
            r.start_date = date(2026, 2, 20);
            let window = window(utc(2026, 3, 2, 0, 0, 0), utc(2026, 3, 8, 23, 59, 59));

            assert!(expand_rule(&r, &window, &Utc).is_empty());
        }
    }

    mod instants {
        use super::*;

        #[test]
        fn wall_clock_times_become_utc_instants() {
            let mut r = rule(OccurrencePattern::Single);
            r.start_date = date(2026, 3, 5);
            let window = window(utc(2026, 3, 2, 0, 0, 0), utc(2026, 3, 8, 23, 59, 59));

            let events = expand_rule(&r, &window, &Utc);
            assert_eq!(events[0].start_at, utc(2026, 3, 5, 9, 0, 0));
            assert_eq!(events[0].end_at, Some(utc(2026, 3, 5, 10, 0, 0)));
        }

        #[test]
        fn local_times_shift_by_the_zone_offset() {
            let tz = FixedOffset::west_opt(5 * 3600).unwrap();
            let mut r = rule(OccurrencePattern::Single);
            r.start_date = date(2026, 3, 5);
            let window = window(utc(2026, 3, 2, 0, 0, 0), utc(2026, 3, 8, 23, 59, 59));

            let events = expand_rule(&r, &window, &tz);
            // 09:00 at UTC-5 is 14:00Z
            assert_eq!(events[0].start_at, utc(2026, 3, 5, 14, 0, 0));
        }

        #[test]
        fn window_dates_are_local_not_utc() {
            // The window starts 2026-03-02T02:00Z, which is still March 1st
            // at UTC-7. A single rule on March 1st must therefore fire.
            let tz = FixedOffset::west_opt(7 * 3600).unwrap();
            let mut r = rule(OccurrencePattern::Single);
            r.start_date = date(2026, 3, 1);
            let window = window(utc(2026, 3, 2, 2, 0, 0), utc(2026, 3, 8, 2, 0, 0));

            let events = expand_rule(&r, &window, &tz);
            assert_eq!(occurrence_dates(&events), vec!["class:cs-1:2026-03-01"]);
        }

        #[test]
        fn occurrences_carry_source_fields() {
            let mut r = rule(OccurrencePattern::Single).with_location("Science Hall 204");
            r.start_date = date(2026, 3, 5);
            let window = window(utc(2026, 3, 2, 0, 0, 0), utc(2026, 3, 8, 23, 59, 59));

            let events = expand_rule(&r, &window, &Utc);
            assert_eq!(events[0].source_type, SourceKind::Class);
            assert_eq!(events[0].source_name, "Class schedule");
            assert_eq!(events[0].title, "CHEM 301");
            assert_eq!(events[0].location.as_deref(), Some("Science Hall 204"));
        }
    }
}

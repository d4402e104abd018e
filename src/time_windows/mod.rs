//! TimeWindowAggregator - timeframe bucketing and per-bucket aggregates
//!
//! ## Responsibilities
//!
//! - Map a timeframe keyword onto an ordered list of labeled buckets
//! - Count events or average processing time per bucket over a
//!   detection-log snapshot
//!
//! Bucket generation is a pure function of `(timeframe, now)`, kept
//! separate from the per-bucket aggregation so the four timeframes and
//! the two aggregation modes stay independently testable. Events whose
//! timestamp fails to parse are treated as matching no bucket.

use chrono::{Datelike, Duration, Months, NaiveDateTime, Timelike};
use serde::Deserialize;

use crate::models::DetectionEvent;

/// Timestamp format written by the recorder; millisecond precision
/// keeps the string fixed-width.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Charting/statistics timeframe. Unrecognized input falls back to
/// `Day` rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Hour,
    Day,
    Week,
    Month,
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::Day
    }
}

impl Timeframe {
    pub fn from_param(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "hour" => Timeframe::Hour,
            "week" => Timeframe::Week,
            "month" => Timeframe::Month,
            _ => Timeframe::Day,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Hour => "hour",
            Timeframe::Day => "day",
            Timeframe::Week => "week",
            Timeframe::Month => "month",
        }
    }

    /// Start of the statistics window ending at `now`. Month is a
    /// calendar month, not a fixed number of days.
    pub fn cutoff(&self, now: NaiveDateTime) -> NaiveDateTime {
        match self {
            Timeframe::Hour => now - Duration::hours(1),
            Timeframe::Day => now - Duration::days(1),
            Timeframe::Week => now - Duration::weeks(1),
            Timeframe::Month => now
                .checked_sub_months(Months::new(1))
                .unwrap_or(now - Duration::days(30)),
        }
    }
}

/// Half-open interval `[start, end)` with a chart display label.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub label: String,
}

/// Ordered bucket sequence for a timeframe, oldest first.
///
/// - Hour: 13 buckets in 5-minute steps, labeled by minutes-ago offset.
/// - Day: 9 buckets in 3-hour steps, labeled with the wall-clock HH:mm.
/// - Week: 7 daily buckets labeled MM/dd.
/// - Month: 4 weekly buckets labeled by ISO week number.
pub fn buckets(timeframe: Timeframe, now: NaiveDateTime) -> Vec<Bucket> {
    match timeframe {
        Timeframe::Hour => (0..=60)
            .rev()
            .step_by(5)
            .map(|minutes_ago| Bucket {
                start: now - Duration::minutes(minutes_ago + 5),
                end: now - Duration::minutes(minutes_ago),
                label: format!("-{}m", minutes_ago),
            })
            .collect(),
        Timeframe::Day => (0..=24)
            .rev()
            .step_by(3)
            .map(|hours_ago| {
                let edge = now - Duration::hours(hours_ago);
                Bucket {
                    start: now - Duration::hours(hours_ago + 1),
                    end: edge,
                    label: format!("{:02}:{:02}", edge.hour(), edge.minute()),
                }
            })
            .collect(),
        Timeframe::Week => (0..=6)
            .rev()
            .map(|days_ago| {
                let day = now - Duration::days(days_ago);
                Bucket {
                    start: now - Duration::days(days_ago + 1),
                    end: day,
                    label: format!("{:02}/{:02}", day.month(), day.day()),
                }
            })
            .collect(),
        Timeframe::Month => (0..=3)
            .rev()
            .map(|weeks_ago| {
                let week = now - Duration::weeks(weeks_ago);
                Bucket {
                    start: now - Duration::weeks(weeks_ago + 1),
                    end: week,
                    label: format!("Week {}", week.iso_week().week()),
                }
            })
            .collect(),
    }
}

/// Parse a stored event timestamp. `None` means the event is silently
/// excluded from whatever window is being computed.
pub fn parse_timestamp(timestamp: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

fn in_bucket(event: &DetectionEvent, bucket: &Bucket) -> bool {
    match parse_timestamp(&event.timestamp) {
        Some(at) => at >= bucket.start && at < bucket.end,
        None => false,
    }
}

/// Count mode: matching events in the bucket.
pub fn count_in(events: &[DetectionEvent], bucket: &Bucket) -> u64 {
    events.iter().filter(|event| in_bucket(event, bucket)).count() as u64
}

/// Average mode: mean processing time across matching events, or
/// `baseline_ms` when the bucket is empty so charts never show a
/// misleading zero.
pub fn average_processing_in(
    events: &[DetectionEvent],
    bucket: &Bucket,
    baseline_ms: f64,
) -> f64 {
    let matching: Vec<&DetectionEvent> = events
        .iter()
        .filter(|event| in_bucket(event, bucket))
        .collect();

    if matching.is_empty() {
        return baseline_ms;
    }

    let total: f64 = matching
        .iter()
        .map(|event| event.processing_time_ms as f64)
        .sum();
    total / matching.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DetectionEvent;
    use chrono::NaiveDate;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn event_at(timestamp: &str, processing_time_ms: u64) -> DetectionEvent {
        DetectionEvent {
            timestamp: timestamp.to_string(),
            objects: Vec::new(),
            processing_time_ms,
            device: "Unknown".to_string(),
            object_count: 0,
            image_url: None,
            file_name: None,
        }
    }

    #[test]
    fn hour_buckets_cover_the_last_hour() {
        let now = at("2026-08-29T12:00:00");
        let hour = buckets(Timeframe::Hour, now);

        assert_eq!(hour.len(), 13);
        assert_eq!(hour.first().unwrap().label, "-60m");
        assert_eq!(hour.last().unwrap().label, "-0m");
        assert_eq!(hour.last().unwrap().end, now);
        for bucket in &hour {
            assert_eq!(bucket.end - bucket.start, Duration::minutes(5));
        }
    }

    #[test]
    fn day_buckets_labeled_with_wall_clock() {
        let now = at("2026-08-29T12:00:00");
        let day = buckets(Timeframe::Day, now);

        assert_eq!(day.len(), 9);
        assert_eq!(day.first().unwrap().label, "12:00"); // 24h ago, same wall clock
        assert_eq!(day.last().unwrap().label, "12:00");
        assert_eq!(day[4].label, "00:00");
    }

    #[test]
    fn week_buckets_labeled_with_dates() {
        let now = at("2026-08-29T12:00:00");
        let week = buckets(Timeframe::Week, now);

        assert_eq!(week.len(), 7);
        assert_eq!(week.first().unwrap().label, "08/23");
        assert_eq!(week.last().unwrap().label, "08/29");
    }

    #[test]
    fn month_buckets_labeled_with_iso_weeks() {
        let now = NaiveDate::from_ymd_opt(2026, 8, 29)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let month = buckets(Timeframe::Month, now);

        assert_eq!(month.len(), 4);
        for bucket in &month {
            assert!(bucket.label.starts_with("Week "));
            assert_eq!(bucket.end - bucket.start, Duration::weeks(1));
        }
    }

    #[test]
    fn bucket_interval_is_half_open() {
        let now = at("2026-08-29T12:00:00");
        let bucket = Bucket {
            start: at("2026-08-29T11:00:00"),
            end: now,
            label: "test".to_string(),
        };

        let at_start = event_at("2026-08-29T11:00:00.000", 100);
        let at_end = event_at("2026-08-29T12:00:00.000", 100);
        let inside = event_at("2026-08-29T11:30:00.000", 100);

        assert_eq!(count_in(&[at_start, inside, at_end], &bucket), 2);
    }

    #[test]
    fn malformed_timestamps_match_nothing() {
        let bucket = Bucket {
            start: at("2026-08-29T00:00:00"),
            end: at("2026-08-30T00:00:00"),
            label: "test".to_string(),
        };
        let bad = event_at("not-a-timestamp", 100);
        assert_eq!(count_in(&[bad], &bucket), 0);
    }

    #[test]
    fn empty_bucket_average_falls_back_to_baseline() {
        let bucket = Bucket {
            start: at("2026-08-29T00:00:00"),
            end: at("2026-08-30T00:00:00"),
            label: "test".to_string(),
        };
        assert_eq!(average_processing_in(&[], &bucket, 500.0), 500.0);

        let events = vec![
            event_at("2026-08-29T10:00:00.000", 100),
            event_at("2026-08-29T11:00:00.000", 200),
        ];
        assert_eq!(average_processing_in(&events, &bucket, 500.0), 150.0);
    }

    #[test]
    fn unrecognized_timeframe_defaults_to_day() {
        assert_eq!(Timeframe::from_param("fortnight"), Timeframe::Day);
        assert_eq!(Timeframe::from_param("HOUR"), Timeframe::Hour);
    }

    #[test]
    fn month_cutoff_is_a_calendar_month() {
        let now = at("2026-03-31T12:00:00");
        // Feb 2026 has 28 days; chrono clamps to the end of February.
        assert_eq!(
            Timeframe::Month.cutoff(now),
            at("2026-02-28T12:00:00")
        );
    }
}

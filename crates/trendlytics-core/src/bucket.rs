//! Bucket planning.
//!
//! Turns an optional `start_date`/`end_date` pair and a [`Granularity`] into a
//! [`BucketPlan`]: the requested range snapped outward to the granularity's
//! natural edges, plus the contiguous UTC buckets covering it. Everything here
//! is pure; "today" is always passed in by the caller.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CoreError;

/// Bucket width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Day,
    /// ISO week, Monday to Sunday.
    Week,
    /// Calendar month, never split.
    Month,
}

impl Granularity {
    /// Lenient parse of a query-string value. Absent or unrecognised values
    /// fall back to [`Granularity::Day`].
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("week") => Self::Week,
            Some("month") => Self::Month,
            _ => Self::Day,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// First calendar date of the period containing `date`.
    pub fn period_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => date,
            Self::Week => {
                let back = u64::from(date.weekday().num_days_from_monday());
                date.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN)
            }
            Self::Month => date.with_day(1).unwrap_or(date),
        }
    }

    /// Last calendar date of the period containing `date`.
    pub fn period_end(self, date: NaiveDate) -> NaiveDate {
        self.advance(self.period_start(date))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Start of the period following the one that begins at `period_start`.
    ///
    /// Month steps are taken from a first-of-month date, so they can never
    /// clamp into the wrong month.
    fn advance(self, period_start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Day => period_start.checked_add_days(Days::new(1)),
            Self::Week => period_start.checked_add_days(Days::new(7)),
            Self::Month => period_start.checked_add_months(Months::new(1)),
        }
    }

    /// Start date used when the caller omits `start_date`.
    ///
    /// day → 7-day window, week → 12 ISO weeks, month → 6 calendar months,
    /// all ending at `end`.
    fn default_start(self, end: NaiveDate) -> NaiveDate {
        let raw = match self {
            Self::Day => end.checked_sub_days(Days::new(6)),
            Self::Week => end.checked_sub_days(Days::new(77)),
            Self::Month => end.checked_sub_months(Months::new(5)),
        };
        self.period_start(raw.unwrap_or(NaiveDate::MIN))
    }

    /// Snap an instant back to 00:00:00.000 UTC of its period's first day.
    pub fn snap_start(self, ts: DateTime<Utc>) -> DateTime<Utc> {
        start_of_day(self.period_start(ts.date_naive()))
    }

    /// Snap an instant forward to 23:59:59.999 UTC of its period's last day.
    pub fn snap_end(self, ts: DateTime<Utc>) -> DateTime<Utc> {
        end_of_day(self.period_end(ts.date_naive()))
    }
}

/// Inclusive UTC range, `start <= end`. Only the planner builds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// One inclusive bucket aligned to its granularity's edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Bucket {
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// UTC calendar date of the bucket's first instant.
    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// UTC calendar date of the bucket's last instant.
    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }
}

/// Output of [`plan_buckets`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPlan {
    pub granularity: Granularity,
    pub range: TimeRange,
    /// Non-empty, ordered, `buckets[i].end + 1ms == buckets[i + 1].start`.
    pub buckets: Vec<Bucket>,
}

/// Bucket plans longer than this are still built, but logged.
const LARGE_PLAN_BUCKETS: usize = 10_000;

/// The UTC calendar date every defaulted bound is relative to.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Plan buckets relative to [`today_utc`].
pub fn plan(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    granularity: Granularity,
) -> Result<BucketPlan, CoreError> {
    plan_buckets(start_date, end_date, granularity, today_utc())
}

/// Default the missing bounds, snap both outward and enumerate buckets.
///
/// An `end_date` earlier than `start_date` is accepted as long as snapping
/// brings the start back to or before the end (e.g. a Wednesday start and
/// the preceding Monday as end, at week granularity). A range that stays
/// inverted after snapping is rejected with [`CoreError::InvertedRange`].
pub fn plan_buckets(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    granularity: Granularity,
    today: NaiveDate,
) -> Result<BucketPlan, CoreError> {
    let end = end_date.unwrap_or(today);
    let start = start_date.unwrap_or_else(|| granularity.default_start(end));

    let first = granularity.period_start(start);
    let last = granularity.period_end(end);
    if first > last {
        return Err(CoreError::InvertedRange { start, end });
    }

    let mut buckets = Vec::new();
    let mut cursor = first;
    while cursor <= last {
        let next = granularity.advance(cursor);
        let bucket_last = next.and_then(|n| n.pred_opt()).unwrap_or(NaiveDate::MAX);
        buckets.push(Bucket {
            start: start_of_day(cursor),
            end: end_of_day(bucket_last),
        });
        match next {
            Some(next) => cursor = next,
            None => break,
        }
    }
    if buckets.len() > LARGE_PLAN_BUCKETS {
        warn!(
            buckets = buckets.len(),
            granularity = granularity.as_str(),
            %first,
            %last,
            "large bucket plan"
        );
    }

    Ok(BucketPlan {
        granularity,
        range: TimeRange {
            start: start_of_day(first),
            end: end_of_day(last),
        },
        buckets,
    })
}

/// Parse a literal `YYYY-MM-DD` date. Anything else, including a trailing
/// time component, a signed year or surrounding whitespace, yields `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    if bytes.len() != 10 {
        return None;
    }
    let shape_ok = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_default()
        .and_utc()
}

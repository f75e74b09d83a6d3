//! Bucket aggregation.
//!
//! Both aggregations sort their input once and sweep it against the bucket
//! list, relying on buckets being ordered, contiguous and non-overlapping.
//! Records outside every bucket are ignored.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::bucket::Bucket;
use crate::record::{EventRecord, TrendRecord};

/// Product trend for one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketedTrend {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// `total_so_far` of the bucket's last record, forward-filled from the
    /// previous bucket (or 0) when the bucket has none.
    pub total_at_end: i64,
    pub added: i64,
    pub removed: i64,
}

/// Event count for one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketedCount {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub count: i64,
}

/// Sum `added`/`removed` per bucket and carry the cumulative total forward.
///
/// `records` may arrive in any order. Records sharing a timestamp keep their
/// input order, so the later one wins `total_at_end`.
pub fn aggregate_trend(records: &[TrendRecord], buckets: &[Bucket]) -> Vec<BucketedTrend> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| r.timestamp);

    let slices = split_by_bucket(&sorted, buckets, |r| r.timestamp);
    let totals: Vec<Option<i64>> = slices
        .iter()
        .map(|inside| inside.last().map(|r| r.total_so_far))
        .collect();
    let totals = forward_fill(&totals);

    slices
        .into_iter()
        .zip(buckets)
        .zip(totals)
        .map(|((inside, bucket), total_at_end)| BucketedTrend {
            start_date: bucket.start_date(),
            end_date: bucket.end_date(),
            total_at_end,
            added: inside.iter().map(|r| r.added).sum(),
            removed: inside.iter().map(|r| r.removed).sum(),
        })
        .collect()
}

/// Count events per bucket. A zero count is a real value; nothing is filled.
pub fn aggregate_count(records: &[EventRecord], buckets: &[Bucket]) -> Vec<BucketedCount> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| r.timestamp);

    split_by_bucket(&sorted, buckets, |r| r.timestamp)
        .into_iter()
        .zip(buckets)
        .map(|(inside, bucket)| BucketedCount {
            start_date: bucket.start_date(),
            end_date: bucket.end_date(),
            count: inside.len() as i64,
        })
        .collect()
}

/// Replace each `None` with the nearest preceding known value, or 0.
pub fn forward_fill(values: &[Option<i64>]) -> Vec<i64> {
    let mut carried = 0;
    values
        .iter()
        .map(|value| {
            if let Some(v) = value {
                carried = *v;
            }
            carried
        })
        .collect()
}

/// Slice `sorted` into one sub-slice per bucket (two-pointer sweep).
fn split_by_bucket<'a, T>(
    sorted: &'a [T],
    buckets: &[Bucket],
    timestamp: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<&'a [T]> {
    let mut rest = sorted;
    buckets
        .iter()
        .map(|bucket| {
            let before = rest.partition_point(|r| timestamp(r) < bucket.start());
            rest = &rest[before..];
            let inside = rest.partition_point(|r| timestamp(r) <= bucket.end());
            let (head, tail) = rest.split_at(inside);
            rest = tail;
            head
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::{plan_buckets, Granularity};
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn trend(ts: DateTime<Utc>, total_so_far: i64, added: i64, removed: i64) -> TrendRecord {
        TrendRecord {
            timestamp: ts,
            total_so_far,
            added,
            removed,
        }
    }

    fn three_days() -> Vec<Bucket> {
        plan_buckets(
            Some(date(2025, 9, 1)),
            Some(date(2025, 9, 3)),
            Granularity::Day,
            date(2025, 9, 3),
        )
        .expect("plan")
        .buckets
    }

    #[test]
    fn gap_inherits_previous_total() {
        let records = vec![
            trend(at(2025, 9, 1, 0), 10, 10, 0),
            trend(at(2025, 9, 3, 0), 15, 6, 1),
        ];
        let out = aggregate_trend(&records, &three_days());
        let totals: Vec<i64> = out.iter().map(|b| b.total_at_end).collect();
        assert_eq!(totals, vec![10, 10, 15]);
        assert_eq!(out[1].added, 0);
        assert_eq!(out[1].removed, 0);
    }

    #[test]
    fn leading_gaps_resolve_to_zero() {
        let records = vec![trend(at(2025, 9, 3, 0), 15, 15, 0)];
        let out = aggregate_trend(&records, &three_days());
        let totals: Vec<i64> = out.iter().map(|b| b.total_at_end).collect();
        assert_eq!(totals, vec![0, 0, 15]);
    }

    #[test]
    fn forward_fill_ignores_records_before_the_range() {
        let records = vec![
            trend(at(2025, 8, 20, 0), 99, 1, 0),
            trend(at(2025, 9, 2, 0), 12, 2, 0),
        ];
        let out = aggregate_trend(&records, &three_days());
        let totals: Vec<i64> = out.iter().map(|b| b.total_at_end).collect();
        assert_eq!(totals, vec![0, 12, 12]);
        assert_eq!(out.iter().map(|b| b.added).sum::<i64>(), 2);
    }

    #[test]
    fn unsorted_records_use_chronologically_last_total() {
        let buckets = plan_buckets(
            Some(date(2025, 9, 1)),
            Some(date(2025, 9, 7)),
            Granularity::Week,
            date(2025, 9, 7),
        )
        .expect("plan")
        .buckets;
        let records = vec![
            trend(at(2025, 9, 5, 0), 30, 5, 2),
            trend(at(2025, 9, 1, 0), 20, 3, 0),
            trend(at(2025, 9, 3, 0), 25, 4, 1),
        ];
        let out = aggregate_trend(&records, &buckets);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].start_date, date(2025, 9, 1));
        assert_eq!(out[0].end_date, date(2025, 9, 7));
        assert_eq!(out[0].total_at_end, 30);
        assert_eq!(out[0].added, 12);
        assert_eq!(out[0].removed, 3);
    }

    #[test]
    fn bucket_edges_are_inclusive() {
        let buckets = three_days();
        let last_ms = at(2025, 9, 2, 0) - Duration::milliseconds(1);
        let events = vec![
            EventRecord { timestamp: at(2025, 9, 1, 0) },
            EventRecord { timestamp: last_ms },
            EventRecord { timestamp: at(2025, 9, 2, 0) },
        ];
        let out = aggregate_count(&events, &buckets);
        let counts: Vec<i64> = out.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 1, 0]);
    }

    #[test]
    fn empty_inputs_give_zero_buckets() {
        let buckets = three_days();
        let counts = aggregate_count(&[], &buckets);
        assert_eq!(counts.len(), 3);
        assert!(counts.iter().all(|b| b.count == 0));

        let trends = aggregate_trend(&[], &buckets);
        assert_eq!(trends.len(), 3);
        assert!(trends
            .iter()
            .all(|b| b.total_at_end == 0 && b.added == 0 && b.removed == 0));
    }

    #[test]
    fn forward_fill_carries_last_known_value() {
        assert_eq!(
            forward_fill(&[None, Some(4), None, None, Some(2), None]),
            vec![0, 4, 4, 4, 2, 2]
        );
        assert!(forward_fill(&[]).is_empty());
    }

    #[test]
    fn serializes_with_camel_case_dates() {
        let out = aggregate_count(
            &[EventRecord { timestamp: at(2025, 9, 2, 12) }],
            &three_days(),
        );
        let json = serde_json::to_value(&out[1]).expect("serialize");
        assert_eq!(json["startDate"], "2025-09-02");
        assert_eq!(json["endDate"], "2025-09-02");
        assert_eq!(json["count"], 1);
    }

    proptest! {
        #[test]
        fn per_bucket_sums_match_records_in_range(
            offsets in proptest::collection::vec((0i64..40 * 86_400, 0i64..50, 0i64..50), 0..60),
            granularity in prop_oneof![
                Just(Granularity::Day),
                Just(Granularity::Week),
                Just(Granularity::Month),
            ],
        ) {
            let plan = plan_buckets(
                Some(date(2025, 1, 10)),
                Some(date(2025, 2, 5)),
                granularity,
                date(2025, 2, 5),
            )
            .expect("plan");
            let origin = at(2025, 1, 1, 0);
            let records: Vec<TrendRecord> = offsets
                .iter()
                .map(|(secs, added, removed)| {
                    trend(origin + Duration::seconds(*secs), 0, *added, *removed)
                })
                .collect();

            let out = aggregate_trend(&records, &plan.buckets);
            let in_range: Vec<&TrendRecord> = records
                .iter()
                .filter(|r| plan.range.contains(r.timestamp))
                .collect();

            prop_assert_eq!(
                out.iter().map(|b| b.added).sum::<i64>(),
                in_range.iter().map(|r| r.added).sum::<i64>()
            );
            prop_assert_eq!(
                out.iter().map(|b| b.removed).sum::<i64>(),
                in_range.iter().map(|r| r.removed).sum::<i64>()
            );

            let events: Vec<EventRecord> = records
                .iter()
                .map(|r| EventRecord { timestamp: r.timestamp })
                .collect();
            let counts = aggregate_count(&events, &plan.buckets);
            prop_assert_eq!(
                counts.iter().map(|b| b.count).sum::<i64>(),
                in_range.len() as i64
            );
        }
    }
}

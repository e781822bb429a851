use serde::{Deserialize, Serialize};
use tracing::warn;

use super::errors::OrderflowError;
use super::structs::Tick;

/// What to do with a stream that is not (date, time) ascending
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderingPolicy {
    /// Fail with `UnsortedInput`
    #[default]
    Reject,
    /// Stable sort by (date, time) before processing, with a warning
    Repair,
}

/// Fail at the first tick whose (date, time) is earlier than its predecessor's.
/// Equal timestamps are allowed and keep arrival order.
pub fn ensure_sorted(ticks: &[Tick]) -> Result<(), OrderflowError> {
    match ticks
        .windows(2)
        .position(|pair| pair[1].timestamp_key() < pair[0].timestamp_key())
    {
        Some(pos) => Err(OrderflowError::UnsortedInput { index: pos + 1 }),
        None => Ok(()),
    }
}

/// Number of positions that step backwards in time
pub fn count_out_of_order(ticks: &[Tick]) -> usize {
    ticks
        .windows(2)
        .filter(|pair| pair[1].timestamp_key() < pair[0].timestamp_key())
        .count()
}

/// Precondition repair: stable sort by (date, time)
pub fn sort_ticks(mut ticks: Vec<Tick>) -> Vec<Tick> {
    ticks.sort_by_key(Tick::timestamp_key);
    ticks
}

/// Apply the ordering policy to an owned stream
pub fn apply_policy(policy: OrderingPolicy, ticks: Vec<Tick>) -> Result<Vec<Tick>, OrderflowError> {
    match policy {
        OrderingPolicy::Reject => {
            ensure_sorted(&ticks)?;
            Ok(ticks)
        }
        OrderingPolicy::Repair => {
            let unsorted = count_out_of_order(&ticks);
            if unsorted == 0 {
                return Ok(ticks);
            }
            warn!("Repairing tick order: {} out-of-order positions in {} ticks", unsorted, ticks.len());
            Ok(sort_ticks(ticks))
        }
    }
}

/// Split a sorted stream into contiguous per-day slices, in day order
pub fn split_by_day(ticks: &[Tick]) -> Vec<&[Tick]> {
    let mut days = Vec::new();
    let mut start = 0;

    for i in 1..ticks.len() {
        if ticks[i].date != ticks[i - 1].date {
            days.push(&ticks[start..i]);
            start = i;
        }
    }
    if start < ticks.len() {
        days.push(&ticks[start..]);
    }

    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticks::structs::{Price, Side};
    use chrono::{NaiveDate, NaiveTime};

    fn tick(day: u32, secs: u32) -> Tick {
        Tick::new(
            NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap(),
            Price::from_ticks(100),
            1,
            Side::Ask,
        )
    }

    #[test]
    fn test_sorted_stream_passes() {
        let ticks = vec![tick(1, 10), tick(1, 10), tick(1, 20), tick(2, 5)];
        assert!(ensure_sorted(&ticks).is_ok());
        assert!(ensure_sorted(&[]).is_ok());
    }

    #[test]
    fn test_unsorted_reports_index() {
        let ticks = vec![tick(1, 10), tick(1, 30), tick(1, 20), tick(2, 5)];
        match ensure_sorted(&ticks) {
            Err(OrderflowError::UnsortedInput { index }) => assert_eq!(index, 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_day_order_dominates_time() {
        let ticks = vec![tick(2, 5), tick(1, 50)];
        assert!(matches!(ensure_sorted(&ticks), Err(OrderflowError::UnsortedInput { index: 1 })));
    }

    #[test]
    fn test_repair_is_stable() {
        let mut a = tick(1, 20);
        a.volume = 1;
        let mut b = tick(1, 20);
        b.volume = 2;
        let ticks = vec![a, tick(1, 5), b];

        let repaired = apply_policy(OrderingPolicy::Repair, ticks).unwrap();
        assert_eq!(repaired[0].time, NaiveTime::from_num_seconds_from_midnight_opt(5, 0).unwrap());
        assert_eq!(repaired[1].volume, 1);
        assert_eq!(repaired[2].volume, 2);
    }

    #[test]
    fn test_reject_policy() {
        let ticks = vec![tick(1, 20), tick(1, 5)];
        assert!(apply_policy(OrderingPolicy::Reject, ticks).is_err());
    }

    #[test]
    fn test_split_by_day() {
        let ticks = vec![tick(1, 1), tick(1, 2), tick(2, 1), tick(3, 1), tick(3, 2)];
        let days = split_by_day(&ticks);
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].len(), 2);
        assert_eq!(days[1].len(), 1);
        assert_eq!(days[2].len(), 2);
        assert!(split_by_day(&[]).is_empty());
    }

    #[test]
    fn test_policy_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            ordering: OrderingPolicy,
        }
        let parsed: Wrapper = toml::from_str("ordering = \"repair\"").unwrap();
        assert_eq!(parsed.ordering, OrderingPolicy::Repair);
    }
}

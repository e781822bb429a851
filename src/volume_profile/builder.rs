use rayon::prelude::*;
use tracing::{debug, info};

use crate::ticks::{ensure_sorted, split_by_day, AnnotatedTick, OrderflowError, Side, Tick};

/// One side of a day: positions within the day slice and running volume at each
#[derive(Debug, Default)]
struct SideRun {
    positions: Vec<usize>,
    cumulative: Vec<u64>,
}

impl SideRun {
    /// Prefix sum of volume over the ticks of `side`, keeping their day positions
    fn collect(day: &[Tick], side: Side) -> Result<Self, OrderflowError> {
        let mut run = SideRun::default();
        let mut total: u64 = 0;

        for (pos, tick) in day.iter().enumerate().filter(|(_, t)| t.side == side) {
            total = total.checked_add(tick.volume).ok_or_else(|| {
                OrderflowError::invalid(format!("{:?} volume overflows on {}", side, tick.date))
            })?;
            run.positions.push(pos);
            run.cumulative.push(total);
        }

        Ok(run)
    }

    fn len(&self) -> usize {
        self.positions.len()
    }
}

/// Build the dynamic volume profile for an ordered tick stream.
///
/// Output has one element per input tick, in input order. Each day is processed
/// independently, so days are fanned out over the rayon pool.
pub fn build_dynamic_profile(ticks: &[Tick]) -> Result<Vec<AnnotatedTick>, OrderflowError> {
    ensure_sorted(ticks)?;
    if ticks.is_empty() {
        return Ok(Vec::new());
    }

    let days = split_by_day(ticks);
    info!("Building dynamic volume profile: {} ticks over {} days", ticks.len(), days.len());

    let per_day = days
        .par_iter()
        .map(|day| build_day(day))
        .collect::<Result<Vec<_>, OrderflowError>>()?;

    let mut annotated = Vec::with_capacity(ticks.len());
    for day in per_day {
        annotated.extend(day);
    }
    Ok(annotated)
}

/// Same as [`build_dynamic_profile`], restricted to prints of at least `min_volume`.
///
/// Smaller prints are dropped before aggregation, so the output holds one
/// element per kept tick.
pub fn build_dynamic_profile_with_volume_filter(
    ticks: &[Tick],
    min_volume: u64,
) -> Result<Vec<AnnotatedTick>, OrderflowError> {
    ensure_sorted(ticks)?;

    let kept: Vec<Tick> = ticks.iter().filter(|t| t.volume >= min_volume).copied().collect();
    debug!(
        "Volume filter >= {} kept {} of {} ticks",
        min_volume,
        kept.len(),
        ticks.len()
    );

    build_dynamic_profile(&kept)
}

fn build_day(day: &[Tick]) -> Result<Vec<AnnotatedTick>, OrderflowError> {
    let ask = SideRun::collect(day, Side::Ask)?;
    let bid = SideRun::collect(day, Side::Bid)?;

    debug!(
        "Day {}: {} ask ticks, {} bid ticks",
        day[0].date,
        ask.len(),
        bid.len()
    );

    Ok(merge_sides(day, &ask, &bid))
}

/// Stable merge of both side runs back into day order.
///
/// The side not traded at a tick carries its last known running total; it is
/// zero only before that side's first print of the day.
fn merge_sides(day: &[Tick], ask: &SideRun, bid: &SideRun) -> Vec<AnnotatedTick> {
    let mut merged = Vec::with_capacity(day.len());
    let (mut next_ask, mut next_bid) = (0, 0);
    let (mut ask_carry, mut bid_carry) = (0u64, 0u64);

    for (pos, tick) in day.iter().enumerate() {
        if next_ask < ask.len() && ask.positions[next_ask] == pos {
            ask_carry = ask.cumulative[next_ask];
            next_ask += 1;
        } else if next_bid < bid.len() && bid.positions[next_bid] == pos {
            bid_carry = bid.cumulative[next_bid];
            next_bid += 1;
        }

        merged.push(AnnotatedTick {
            tick: *tick,
            ask_volume_so_far: ask_carry,
            bid_volume_so_far: bid_carry,
        });
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticks::Price;
    use chrono::{NaiveDate, NaiveTime};

    fn tick(day: u32, secs: u32, price: i64, volume: u64, side: Side) -> Tick {
        Tick::new(
            NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            NaiveTime::from_num_seconds_from_midnight_opt(34_200 + secs, 0).unwrap(),
            Price::from_ticks(price),
            volume,
            side,
        )
    }

    fn counters(profile: &[AnnotatedTick]) -> Vec<(u64, u64)> {
        profile.iter().map(|a| (a.ask_volume_so_far, a.bid_volume_so_far)).collect()
    }

    #[test]
    fn test_single_day_example() {
        let ticks = vec![
            tick(3, 1, 100, 10, Side::Ask),
            tick(3, 2, 100, 5, Side::Bid),
            tick(3, 3, 101, 20, Side::Ask),
        ];

        let profile = build_dynamic_profile(&ticks).unwrap();
        assert_eq!(counters(&profile), vec![(10, 0), (10, 5), (30, 5)]);
    }

    #[test]
    fn test_carry_forward_across_other_side() {
        let ticks = vec![
            tick(3, 1, 100, 4, Side::Bid),
            tick(3, 2, 100, 3, Side::Bid),
            tick(3, 3, 101, 7, Side::Ask),
            tick(3, 4, 101, 1, Side::Bid),
            tick(3, 5, 102, 2, Side::Ask),
            tick(3, 6, 102, 6, Side::Bid),
        ];

        let profile = build_dynamic_profile(&ticks).unwrap();
        assert_eq!(
            counters(&profile),
            vec![(0, 4), (0, 7), (7, 7), (7, 8), (9, 8), (9, 14)]
        );
    }

    #[test]
    fn test_day_boundary_resets() {
        let ticks = vec![
            tick(3, 1, 100, 10, Side::Ask),
            tick(3, 2, 100, 5, Side::Bid),
            tick(4, 1, 100, 2, Side::Bid),
            tick(4, 2, 100, 3, Side::Ask),
        ];

        let profile = build_dynamic_profile(&ticks).unwrap();
        assert_eq!(counters(&profile), vec![(10, 0), (10, 5), (0, 2), (3, 2)]);
    }

    #[test]
    fn test_single_sided_day() {
        let ticks = vec![
            tick(3, 1, 100, 1, Side::Bid),
            tick(3, 2, 100, 2, Side::Bid),
            tick(3, 3, 100, 3, Side::Bid),
        ];

        let profile = build_dynamic_profile(&ticks).unwrap();
        assert!(profile.iter().all(|a| a.ask_volume_so_far == 0));
        assert_eq!(profile.last().unwrap().bid_volume_so_far, 6);
    }

    #[test]
    fn test_zero_volume_ticks() {
        let ticks = vec![
            tick(3, 1, 100, 0, Side::Ask),
            tick(3, 2, 100, 5, Side::Ask),
            tick(3, 3, 100, 0, Side::Ask),
        ];

        let profile = build_dynamic_profile(&ticks).unwrap();
        assert_eq!(counters(&profile), vec![(0, 0), (5, 0), (5, 0)]);
    }

    #[test]
    fn test_equal_timestamps_keep_arrival_order() {
        let ticks = vec![
            tick(3, 1, 100, 1, Side::Ask),
            tick(3, 1, 100, 2, Side::Bid),
            tick(3, 1, 100, 3, Side::Ask),
        ];

        let profile = build_dynamic_profile(&ticks).unwrap();
        assert_eq!(counters(&profile), vec![(1, 0), (1, 2), (4, 2)]);
        assert_eq!(profile[1].tick, ticks[1]);
    }

    #[test]
    fn test_empty_input() {
        assert!(build_dynamic_profile(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_unsorted_input_fails_fast() {
        let ticks = vec![tick(3, 5, 100, 1, Side::Ask), tick(3, 1, 100, 1, Side::Ask)];
        assert!(matches!(
            build_dynamic_profile(&ticks),
            Err(OrderflowError::UnsortedInput { index: 1 })
        ));
    }

    #[test]
    fn test_overflow_is_reported() {
        let ticks = vec![
            tick(3, 1, 100, u64::MAX, Side::Ask),
            tick(3, 2, 100, 1, Side::Ask),
        ];
        assert!(matches!(build_dynamic_profile(&ticks), Err(OrderflowError::InvalidInput(_))));
    }

    #[test]
    fn test_volume_filter() {
        let ticks = vec![
            tick(3, 1, 100, 50, Side::Ask),
            tick(3, 2, 100, 2, Side::Ask),
            tick(3, 3, 100, 80, Side::Bid),
            tick(3, 4, 100, 60, Side::Ask),
            tick(4, 1, 100, 1, Side::Bid),
            tick(4, 2, 100, 70, Side::Bid),
        ];

        let profile = build_dynamic_profile_with_volume_filter(&ticks, 50).unwrap();
        assert_eq!(profile.len(), 4);
        assert_eq!(counters(&profile), vec![(50, 0), (50, 80), (110, 80), (0, 70)]);
    }

    #[test]
    fn test_volume_filter_zero_threshold_is_identity() {
        let ticks = vec![tick(3, 1, 100, 0, Side::Ask), tick(3, 2, 100, 4, Side::Bid)];
        assert_eq!(
            build_dynamic_profile_with_volume_filter(&ticks, 0).unwrap(),
            build_dynamic_profile(&ticks).unwrap()
        );
    }
}

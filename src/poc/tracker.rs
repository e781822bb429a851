use chrono::{NaiveDate, NaiveTime};
use rayon::prelude::*;
use tracing::{debug, info};

use super::table::DailyPocTable;
use crate::ticks::{ensure_sorted, split_by_day, OrderflowError, Price, Tick};

/// Incremental moving POC over a time-ordered stream.
///
/// The first tick of the stream and of every new day seeds a fresh table and is
/// emitted as its own POC. Later ticks of the day emit the table leader. The
/// stream end is unknown here, so the last-tick rule lives in [`moving_poc`].
#[derive(Debug, Clone, Default)]
pub struct MovingPocTracker {
    table: DailyPocTable,
    last_key: Option<(NaiveDate, NaiveTime)>,
    ticks_seen: usize,
}

impl MovingPocTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incorporate one tick and return the POC at this position
    pub fn push(&mut self, tick: &Tick) -> Result<Price, OrderflowError> {
        let key = tick.timestamp_key();
        let poc = match self.last_key {
            Some(prev) if key < prev => {
                return Err(OrderflowError::UnsortedInput { index: self.ticks_seen });
            }
            Some((date, _)) if date == tick.date => self.table.add(tick.price, tick.volume)?,
            previous => {
                if let Some((date, _)) = previous {
                    debug!(
                        "Day boundary {} -> {}, resetting POC table ({} levels, POC {:?} with {} lots)",
                        date,
                        tick.date,
                        self.table.len(),
                        self.table.poc(),
                        self.table.poc().map(|p| self.table.volume_at(p)).unwrap_or(0)
                    );
                }
                self.table.seed(tick.price, tick.volume);
                tick.price
            }
        };

        self.last_key = Some(key);
        self.ticks_seen += 1;
        Ok(poc)
    }

    pub fn current_poc(&self) -> Option<Price> {
        self.table.poc()
    }

    /// Price levels in the current day's table
    pub fn levels(&self) -> usize {
        self.table.len()
    }

    pub fn ticks_seen(&self) -> usize {
        self.ticks_seen
    }

    pub fn reset(&mut self) {
        self.table.clear();
        self.last_key = None;
        self.ticks_seen = 0;
    }
}

/// Moving POC for a whole run, one price per input tick.
///
/// Requires at least two ticks. The last position always emits its own price
/// without consulting the table. Days run in parallel, each with a private table.
pub fn moving_poc(ticks: &[Tick]) -> Result<Vec<Price>, OrderflowError> {
    if ticks.len() < 2 {
        return Err(OrderflowError::invalid(format!(
            "moving POC needs at least 2 ticks, got {}",
            ticks.len()
        )));
    }
    ensure_sorted(ticks)?;

    let days = split_by_day(ticks);
    info!("Tracking moving POC: {} ticks over {} days", ticks.len(), days.len());

    let per_day = days
        .par_iter()
        .map(|day| track_day(day))
        .collect::<Result<Vec<_>, OrderflowError>>()?;

    let mut poc = Vec::with_capacity(ticks.len());
    for day in per_day {
        poc.extend(day);
    }

    if let (Some(slot), Some(last)) = (poc.last_mut(), ticks.last()) {
        *slot = last.price;
    }

    Ok(poc)
}

fn track_day(day: &[Tick]) -> Result<Vec<Price>, OrderflowError> {
    let mut tracker = MovingPocTracker::new();
    let poc = day
        .iter()
        .map(|tick| tracker.push(tick))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        "Day {}: {} ticks, {} price levels, closing table POC {:?}",
        day[0].date,
        day.len(),
        tracker.levels(),
        tracker.current_poc()
    );
    Ok(poc)
}

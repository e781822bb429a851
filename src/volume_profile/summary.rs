use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ticks::{AnnotatedTick, OrderflowError, Price};

/// End-of-day totals derived from an annotated stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub tick_count: usize,
    pub ask_volume: u64,
    pub bid_volume: u64,
    /// Ask minus bid volume
    pub delta: i64,
    /// POC emitted at the day's last tick
    pub closing_poc: Price,
}

/// Summarize each day of a profile, pairing it with the position-aligned POC sequence
pub fn summarize_days(profile: &[AnnotatedTick], poc: &[Price]) -> Result<Vec<DaySummary>, OrderflowError> {
    if profile.len() != poc.len() {
        return Err(OrderflowError::invalid(format!(
            "profile has {} ticks but POC sequence has {}",
            profile.len(),
            poc.len()
        )));
    }

    let mut summaries: Vec<DaySummary> = Vec::new();
    for (annotated, &poc_price) in profile.iter().zip(poc) {
        let date = annotated.tick.date;
        match summaries.last_mut() {
            Some(current) if current.date == date => {
                current.tick_count += 1;
                current.ask_volume = annotated.ask_volume_so_far;
                current.bid_volume = annotated.bid_volume_so_far;
                current.closing_poc = poc_price;
            }
            _ => summaries.push(DaySummary {
                date,
                tick_count: 1,
                ask_volume: annotated.ask_volume_so_far,
                bid_volume: annotated.bid_volume_so_far,
                delta: 0,
                closing_poc: poc_price,
            }),
        }
    }

    for summary in &mut summaries {
        let delta = i128::from(summary.ask_volume) - i128::from(summary.bid_volume);
        summary.delta = i64::try_from(delta).map_err(|_| {
            OrderflowError::invalid(format!(
                "volume delta {} on {} does not fit in i64",
                delta, summary.date
            ))
        })?;
    }

    Ok(summaries)
}

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::OrderflowError;
use super::precision::PriceQuantizer;

/// Side of the book a trade executed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    /// Wire discriminator used by the recorded `TradeType` column
    pub fn discriminator(self) -> u8 {
        match self {
            Side::Bid => 1,
            Side::Ask => 2,
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = OrderflowError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Side::Bid),
            2 => Ok(Side::Ask),
            other => Err(OrderflowError::invalid(format!(
                "side discriminator {} is not 1 (bid) or 2 (ask)",
                other
            ))),
        }
    }
}

/// Fixed-point price expressed as a whole number of price increments.
///
/// Exact equality makes it usable as a frequency table key; floating point
/// prices never reach the aggregation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(i64);

impl Price {
    pub const fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    pub fn ticks(self) -> i64 {
        self.0
    }

    /// Convert back to a decimal price for display
    pub fn to_f64(self, increment: f64) -> f64 {
        self.0 as f64 * increment
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}t", self.0)
    }
}

/// Normalized trade record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub price: Price,
    pub volume: u64,
    pub side: Side,
}

impl Tick {
    pub fn new(date: NaiveDate, time: NaiveTime, price: Price, volume: u64, side: Side) -> Self {
        Self { date, time, price, volume, side }
    }

    /// Ordering key of the stream
    pub fn timestamp_key(&self) -> (NaiveDate, NaiveTime) {
        (self.date, self.time)
    }
}

/// Tick as handed over by the ingestion layer, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTick {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Time")]
    pub time: NaiveTime,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Volume")]
    pub volume: i64,
    #[serde(rename = "TradeType")]
    pub trade_type: u8,
}

impl RawTick {
    /// Validate side and volume, and quantize the price onto the increment grid
    pub fn normalize(&self, quantizer: &PriceQuantizer) -> Result<Tick, OrderflowError> {
        let side = Side::try_from(self.trade_type)?;
        if self.volume < 0 {
            return Err(OrderflowError::invalid(format!(
                "negative volume {} at {} {}",
                self.volume, self.date, self.time
            )));
        }
        let price = quantizer.quantize(self.price)?;

        Ok(Tick {
            date: self.date,
            time: self.time,
            price,
            volume: self.volume as u64,
            side,
        })
    }
}

/// Tick annotated with the day's running volume per side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedTick {
    pub tick: Tick,
    pub ask_volume_so_far: u64,
    pub bid_volume_so_far: u64,
}

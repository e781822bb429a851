use tracing::debug;

use super::errors::OrderflowError;
use super::structs::Price;

/// Default tolerance, as a fraction of one increment, for off-grid prices
pub const DEFAULT_GRID_TOLERANCE: f64 = 0.001;

/// Maps decimal prices onto an integral increment grid
#[derive(Debug, Clone)]
pub struct PriceQuantizer {
    /// Size of one price increment (tick size)
    increment: f64,
    /// Maximum distance from the grid, in increments, accepted in strict mode
    tolerance: f64,
    /// Reject off-grid prices instead of snapping them
    strict: bool,
}

impl PriceQuantizer {
    /// Strict quantizer with the default grid tolerance
    pub fn new(increment: f64) -> Result<Self, OrderflowError> {
        Self::with_tolerance(increment, DEFAULT_GRID_TOLERANCE, true)
    }

    pub fn with_tolerance(increment: f64, tolerance: f64, strict: bool) -> Result<Self, OrderflowError> {
        if !increment.is_finite() || increment <= 0.0 {
            return Err(OrderflowError::invalid(format!("invalid price increment: {}", increment)));
        }
        if !tolerance.is_finite() || !(0.0..0.5).contains(&tolerance) {
            return Err(OrderflowError::invalid(format!(
                "grid tolerance must be within [0, 0.5), got {}",
                tolerance
            )));
        }

        Ok(Self { increment, tolerance, strict })
    }

    pub fn increment(&self) -> f64 {
        self.increment
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Convert a decimal price to its grid key.
    /// Uses round half to even on the price/increment ratio.
    pub fn quantize(&self, price: f64) -> Result<Price, OrderflowError> {
        if !price.is_finite() || price < 0.0 {
            return Err(OrderflowError::invalid(format!("price {} is not a finite non-negative number", price)));
        }

        let ratio = price / self.increment;
        if ratio >= i64::MAX as f64 {
            return Err(OrderflowError::invalid(format!(
                "price {} overflows the grid for increment {}",
                price, self.increment
            )));
        }

        let key = banker_round(ratio);
        let deviation = (ratio - key as f64).abs();
        if deviation > self.tolerance {
            if self.strict {
                return Err(OrderflowError::invalid(format!(
                    "price {} is off the {} increment grid by {:.4} increments",
                    price, self.increment, deviation
                )));
            }
            debug!("Snapped off-grid price {} to key {} (deviation {:.4})", price, key, deviation);
        }

        Ok(Price::from_ticks(key))
    }

    pub fn to_decimal(&self, price: Price) -> f64 {
        price.to_f64(self.increment)
    }
}

/// Banker's rounding (round half to even) for consistent boundary handling
fn banker_round(value: f64) -> i64 {
    let fractional = value.fract().abs();

    if (fractional - 0.5).abs() < f64::EPSILON {
        let truncated = value.trunc() as i64;
        if truncated % 2 == 0 {
            truncated
        } else if value >= 0.0 {
            truncated + 1
        } else {
            truncated - 1
        }
    } else {
        value.round() as i64
    }
}

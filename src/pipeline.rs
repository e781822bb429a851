use serde::Serialize;
use tracing::{info, warn};

use crate::config::OrderflowConfig;
use crate::poc::moving_poc;
use crate::ticks::{apply_policy, AnnotatedTick, OrderflowError, Price, PriceQuantizer, RawTick, Tick};
use crate::volume_profile::{build_dynamic_profile, build_dynamic_profile_with_volume_filter, summarize_days, DaySummary};

/// Result of one run over a tick stream
#[derive(Debug, Clone, Serialize)]
pub struct OrderflowReport {
    pub profile: Vec<AnnotatedTick>,
    /// Position-aligned with the full input stream
    pub poc: Option<Vec<Price>>,
    /// Empty unless the POC was computed and the profile is unfiltered
    pub summaries: Vec<DaySummary>,
}

/// Normalizes raw ticks and runs both analytics under one configuration
#[derive(Debug, Clone)]
pub struct OrderflowPipeline {
    config: OrderflowConfig,
    quantizer: PriceQuantizer,
}

impl OrderflowPipeline {
    pub fn new(config: OrderflowConfig) -> Result<Self, OrderflowError> {
        config.validate()?;
        let quantizer = config.quantizer()?;
        Ok(Self { config, quantizer })
    }

    pub fn config(&self) -> &OrderflowConfig {
        &self.config
    }

    pub fn quantizer(&self) -> &PriceQuantizer {
        &self.quantizer
    }

    /// Validate and quantize raw records, keeping their input order.
    /// The first bad record fails the whole batch.
    pub fn normalize(&self, raw: Vec<RawTick>) -> Result<Vec<Tick>, OrderflowError> {
        raw.iter()
            .enumerate()
            .map(|(row, record)| {
                record.normalize(&self.quantizer).map_err(|e| match e {
                    OrderflowError::InvalidInput(msg) => OrderflowError::InvalidInput(format!("row {}: {}", row, msg)),
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()
    }

    /// Apply the ordering policy, then compute the volume profile and, if
    /// enabled, the moving POC. Unsorted input is accepted only under `Repair`.
    pub fn run(&self, ticks: Vec<Tick>) -> Result<OrderflowReport, OrderflowError> {
        let ticks = apply_policy(self.config.processing.ordering, ticks)?;
        let processing = &self.config.processing;

        let profile = if processing.min_print_volume > 0 {
            build_dynamic_profile_with_volume_filter(&ticks, processing.min_print_volume)?
        } else {
            build_dynamic_profile(&ticks)?
        };

        let poc = if processing.poc_enabled {
            if ticks.len() >= 2 {
                Some(moving_poc(&ticks)?)
            } else {
                warn!("Skipping moving POC: {} ticks, at least 2 required", ticks.len());
                None
            }
        } else {
            None
        };

        let summaries = match &poc {
            Some(poc) if profile.len() == poc.len() => summarize_days(&profile, poc)?,
            _ => Vec::new(),
        };

        info!(
            "Orderflow run complete: {} ticks, {} profile rows, {} days summarized",
            ticks.len(),
            profile.len(),
            summaries.len()
        );

        Ok(OrderflowReport { profile, poc, summaries })
    }
}

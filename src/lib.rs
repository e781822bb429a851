//! Order-flow analytics over tick-by-tick trade records.
//!
//! Two independent batch components consume the same time-ordered tick stream:
//! the dynamic volume profile builder (per-day, per-side cumulative volume) and
//! the moving point of control tracker (intra-day price with the most volume).
pub mod config;
pub mod logging;
pub mod pipeline;
pub mod poc;
pub mod ticks;
pub mod volume_profile;

pub use config::OrderflowConfig;
pub use pipeline::{OrderflowPipeline, OrderflowReport};
pub use poc::{moving_poc, MovingPocTracker};
pub use ticks::{AnnotatedTick, OrderflowError, Price, PriceQuantizer, RawTick, Side, Tick};
pub use volume_profile::{build_dynamic_profile, build_dynamic_profile_with_volume_filter, summarize_days, DaySummary};

/// Dynamic Volume Profile Module
///
/// Annotates every tick with the volume traded so far in the current day on the
/// ask and bid side. Counters reset at each day boundary.
pub mod builder;
pub mod summary;

pub use builder::{build_dynamic_profile, build_dynamic_profile_with_volume_filter};
pub use summary::{summarize_days, DaySummary};

/// Moving Point of Control Module
///
/// Tracks, tick by tick, the price holding the most volume so far in the
/// current trading day.
pub mod table;
pub mod tracker;

pub use table::DailyPocTable;
pub use tracker::{moving_poc, MovingPocTracker};

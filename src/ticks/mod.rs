pub mod errors;
pub mod ordering;
pub mod precision;
pub mod structs;

pub use errors::OrderflowError;
pub use ordering::{apply_policy, count_out_of_order, ensure_sorted, sort_ticks, split_by_day, OrderingPolicy};
pub use precision::PriceQuantizer;
pub use structs::{AnnotatedTick, Price, RawTick, Side, Tick};

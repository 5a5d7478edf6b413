//! Stats façade: per player key/value statistics.

mod stats;
pub use stats::{Access, Stats, StatsUpdate};

//! Database connectivity probing.

mod prober;

pub use prober::{DbProber, DbSettings, ProbeResult};

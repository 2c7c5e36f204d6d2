//! The time-series pipeline.
//!
//! Responsibilities:
//!
//! - trailing-window filtering anchored to the data's latest period
//! - down-sampling to weekly / monthly bins
//! - derived metrics: percent change, spread, rolling mean and volatility
//! - trailing-mean ranking across entities
//! - flow-graph preparation for the import diagram
//!
//! Stages are pure: they take series in, hand series out, and never touch
//! files or the network. The intended order is filter, then resample, then
//! derive.

pub mod aggregate;
pub mod filter;
pub mod flows;
pub mod metrics;
pub mod resample;

pub use aggregate::*;
pub use filter::*;
pub use flows::*;
pub use metrics::*;
pub use resample::*;

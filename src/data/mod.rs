//! External data acquisition.
//!
//! - EIA v2 API client + dataset projections (`eia`)

pub mod eia;

pub use eia::*;

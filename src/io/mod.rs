//! Input/output helpers.
//!
//! - CSV ingest + row-level validation (`ingest`)
//! - dataset persistence and series exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;

//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the canonical series model (`SeriesPoint`, `Series`, `MultiSeries`)
//! - derived-metric rows as rendered by charts (`DerivedPoint`, `DerivedSeries`)
//! - flow-graph types for the import diagram (`FlowRecord`, `FlowGraph`)
//! - user-facing parameter enums (`TimeWindow`, `Frequency`, `Dataset`)

pub mod types;

pub use types::*;

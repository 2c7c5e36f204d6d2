//! Terminal report rendering for the CLI subcommands.

pub mod format;

pub use format::*;

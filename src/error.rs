//! Application error type.
//!
//! Every fallible path in the crate funnels into `AppError`, which carries the
//! process exit code alongside the message:
//!
//! - `2` — usage/configuration problems (bad flag values, invalid window or
//!   theme settings, missing API key)
//! - `3` — no usable data (a dataset file is missing or a fetch returned
//!   nothing to work with)
//! - `4` — runtime failures (HTTP transport, terminal setup, file writes)
//!
//! Row-level anomalies in ingested CSVs are deliberately *not* errors; they
//! are collected as `RowIssue`s and surfaced in reports and the health bundle.

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

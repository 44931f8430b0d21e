//! Logging utilities.
//!
//! This module centralizes logger initialization. Everything else in the
//! crate talks to the standard `log` facade only.

mod init;

pub use init::{init_logging, LoggingConfig};

//! Logging utilities.
//!
//! Engine code only talks to the `log` facade. This module owns the one place
//! where a concrete backend (`env_logger`) is installed, for the studio and
//! for tests that want output.

mod init;

pub use init::{init_logging, LoggingConfig};

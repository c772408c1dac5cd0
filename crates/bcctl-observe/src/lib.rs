//! Logging setup for the controller binary.
//!
//! Diagnostics are written to stderr; stdout is left to progress markers and info payloads.

mod logger;
pub use logger::*;

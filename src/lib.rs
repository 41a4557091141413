//! Aggregate network throughput for status bars.
//!
//! Samples `/proc/net/dev` once per tick, sums the physical interfaces and
//! prints a `↓ 1.00 M/s ↑ 20.00 K/s` style line.

pub mod config;
pub mod error;
pub mod logging;
pub mod modules;

pub use error::{MonitorError, Result};

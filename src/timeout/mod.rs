//! Command timeouts
//!
//! Ordered deadlines for `timeout`-wrapped commands sharing one OS timer.

pub mod scheduler;

pub use scheduler::{TimeoutEntry, TimeoutScheduler};

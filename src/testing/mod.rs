//! Testing infrastructure
//!
//! Fake process control and timer backends for exercising the shell without
//! touching real processes.

pub mod fakes;

// Re-export commonly used items
pub use fakes::*;

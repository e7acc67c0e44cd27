//! Job bookkeeping
//!
//! The table of background/stopped jobs and the single foreground slot.

pub mod foreground;
pub mod table;

pub use foreground::{ForegroundJob, ForegroundSlot};
pub use table::{Job, JobTable};

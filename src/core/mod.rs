//! Shell core.
//!
//! Core owns the shared shell context (job table, foreground slot, timeout
//! queue) and the reactions to asynchronous signals. Command execution lives
//! in [`crate::exec`].

pub mod handlers;
pub mod shell;

pub use shell::{Flow, Shell};

//! smash: a small job-control shell
//! Foreground and background jobs, pipelines, output redirection and
//! per-command timeouts on top of fork/exec and process groups
//!
//! # Architecture
//!
//! ## Command Model ([`command`])
//! - [`command::parse`]: Whitespace tokenizer and background-sign handling
//! - [`command::model`]: Closed set of command variants and their wrappers
//!
//! ## Job Bookkeeping ([`jobs`])
//! - [`jobs::table`]: Background and stopped jobs, id assignment, reaping
//! - [`jobs::foreground`]: The single foreground slot
//!
//! ## Kernel Primitives ([`kernel`])
//! - [`kernel::process`]: fork, process groups, waitpid, descriptors
//! - [`kernel::signal`]: Async-safe pending set for SIGTSTP, SIGINT, SIGALRM
//! - [`kernel::timer`]: The shared `ITIMER_REAL` interval timer
//!
//! ## Shell Core ([`core`])
//! - [`core::shell`]: Shared shell context
//! - [`core::handlers`]: ctrl-Z, ctrl-C and timer expiry reactions
//!
//! ## Execution Control ([`exec`])
//! - [`exec::engine`]: Dispatch, fork/exec and foreground waiting
//! - [`exec::pipeline`]: Two-sided pipes (`|`, `|&`)
//! - [`exec::redirect`]: `>` and `>>` with stdout restoration
//! - [`exec::copy`]: The `cp` built-in
//! - [`exec::builtins`]: chprompt, showpid, pwd, cd, jobs, kill, fg, bg, quit
//!
//! ## Timeouts ([`timeout`])
//! - [`timeout::scheduler`]: Deadlines ordered by remaining time
//!
//! ## Configuration ([`config`])
//! - [`config::types`]: `ShellConfig` and the `ShellError` taxonomy
//! - [`config::loader`]: JSON file plus command-line overrides
//! - [`config::validator`]: Startup validation
//!
//! ## Utilities ([`utils`]) and Testing Infrastructure ([`testing`])
//! - [`utils::line_reader`]: Signal-aware line input
//! - [`testing::fakes`]: Recording process-control and timer backends

// Command Model
pub mod command;

// Job Bookkeeping
pub mod jobs;

// Kernel Primitives
pub mod kernel;

// Shell core
pub mod core;

// Execution Control
pub mod exec;

// Timeouts
pub mod timeout;

// Configuration
pub mod config;

// Utilities
pub mod utils;

// Testing Infrastructure
pub mod testing;

// CLI entrypoint wiring for the smash binary.
pub mod cli;

// Re-export commonly used types for convenience
pub use config::types::*;
pub use crate::core::{Flow, Shell};

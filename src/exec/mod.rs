//! Execution control
//!
//! Realizes parsed commands as processes: fork/exec, pipelines, output
//! redirection, the copy built-in and foreground waiting.

pub mod builtins;
pub mod copy;
pub mod engine;
pub mod pipeline;
pub mod redirect;

pub use engine::{TimeoutRequest, WaitOutcome};
pub use redirect::StdoutRedirect;

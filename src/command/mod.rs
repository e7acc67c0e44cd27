//! Command model
//!
//! Tokenizing helpers and the closed set of command variants a line parses into.

pub mod model;
pub mod parse;

pub use model::{Command, CommandLine, PipeStream, Pipeline, RedirectMode, Redirection};

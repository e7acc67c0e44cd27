//! Thin wrappers around the OS primitives the shell is built on.
//!
//! All `unsafe` code is concentrated here.

pub mod process;
pub mod signal;
pub mod timer;

//! Configuration
//!
//! Shell settings, their loading and validation, and the shared error type.

pub mod loader;
pub mod types;
pub mod validator;

//! Utilities
//!
//! Cross-cutting helpers for terminal input.

pub mod line_reader;

pub use line_reader::LineReader;

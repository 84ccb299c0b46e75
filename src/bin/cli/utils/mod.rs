//! CLI utilities module
//!
//! Provides shared utilities for CLI commands including validation,
//! display formatting, and error handling.

pub mod display;
pub mod error;
pub mod validation;

pub use display::*;
pub use error::*;
pub use validation::*;

//! Bookshelf Application Library
//!
//! Loads book records from JSON and validates them into immutable,
//! normalized [`books::Book`] values.

pub mod modules;
pub mod utils;

/// Re-export commonly used types
pub use modules::*;

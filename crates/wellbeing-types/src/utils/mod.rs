//! Utility functions for lenient decoding and display formatting.

pub mod conversion;
pub mod formatting;

pub use formatting::{date_part, format_currency, truncate_id};

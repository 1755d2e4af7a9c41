//! Common types module for the Wellbeing-360 pharmacy client.
//!
//! This module defines the records exchanged with the pharmacy backend and
//! the small set of shared types (events, validation, registry) used by the
//! other workspace crates.

/// API envelope and employee lookup types.
pub mod api;
/// Notification events published by the order workflow.
pub mod events;
/// Pharmacy orders, line items and the order status enumeration.
pub mod order;
/// Payment records and payment status.
pub mod payment;
/// Registry trait for named backend implementations.
pub mod registry;
/// Raw dashboard statistics as returned by the backend.
pub mod statistics;
/// Formatting and lenient decoding helpers.
pub mod utils;
/// Configuration validation types.
pub mod validation;

pub use api::*;
pub use events::*;
pub use order::*;
pub use payment::*;
pub use registry::ImplementationRegistry;
pub use statistics::*;
pub use utils::{date_part, format_currency, truncate_id};
pub use validation::*;

//! Screen controllers for the Wellbeing-360 pharmacy client.
//!
//! Each screen owns its state explicitly: [`OrderBoard`] for orders and the
//! status stepper, [`PaymentsView`] for payments, [`StatisticsSummary`] for the
//! dashboard. Workflow outcomes are published on the [`EventBus`] for whatever
//! notification surface is attached.

use thiserror::Error;
use wellbeing_workflow::WorkflowError;

pub mod board;
pub mod event_bus;
pub mod export;
pub mod payments;
pub mod statistics;

pub use board::{OrderBoard, OrderView};
pub use event_bus::EventBus;
pub use export::{export_employee_orders, ExportError};
pub use payments::{PaymentsView, StatusTab};
pub use statistics::StatisticsSummary;

/// Errors surfaced by the screen controllers.
#[derive(Debug, Error)]
pub enum BoardError {
	#[error(transparent)]
	Workflow(#[from] WorkflowError),
	#[error("Backend error: {0}")]
	Backend(String),
	#[error("Order not found: {0}")]
	UnknownOrder(String),
	#[error("No order selected")]
	NothingSelected,
}

impl BoardError {
	/// Text for the notification surface.
	pub fn user_message(&self) -> String {
		match self {
			BoardError::Workflow(e) => e.user_message(),
			other => other.to_string(),
		}
	}
}

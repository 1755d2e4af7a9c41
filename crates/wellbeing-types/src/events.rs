//! Notification events for the order workflow.
//!
//! These events are what the notification surface (a toast in the browser
//! front end, stdout in the CLI) consumes after each advance attempt.

use serde::{Deserialize, Serialize};

use crate::OrderStatus;

/// Outcome of a single advance attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkflowEvent {
	/// The backend confirmed the transition.
	StatusAdvanced {
		order_id: String,
		from: OrderStatus,
		to: OrderStatus,
	},
	/// The transition was refused or could not be delivered.
	AdvanceFailed {
		order_id: String,
		/// Unknown when the attempt was refused before the order was read.
		from: Option<OrderStatus>,
		to: Option<OrderStatus>,
		reason: String,
	},
}

impl WorkflowEvent {
	pub fn order_id(&self) -> &str {
		match self {
			WorkflowEvent::StatusAdvanced { order_id, .. } => order_id,
			WorkflowEvent::AdvanceFailed { order_id, .. } => order_id,
		}
	}

	pub fn is_success(&self) -> bool {
		matches!(self, WorkflowEvent::StatusAdvanced { .. })
	}
}

//! Order status workflow for the Wellbeing-360 pharmacy client.
//!
//! Orders move forward one step at a time through
//! `placed -> processing -> completed -> delivered -> ready_to_pickup`.
//! The transition table and the presenter are pure; [`OrderWorkflow`] issues
//! the single update request that asks the backend to apply a transition.
//! Nothing here mutates a held order: after a confirmed advance the caller
//! re-fetches.

use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;
use wellbeing_client::{BackendError, BackendService};
use wellbeing_types::{truncate_id, OrderStatus};

pub mod presenter;
pub mod transitions;

pub use presenter::{action_label, progress_index, progress_index_for, stepper, Step};
pub use transitions::{next_status, next_status_for, status_update_for, NextStatus};

/// Message shown when the backend gives no reason for a failure.
const GENERIC_FAILURE: &str = "Failed to update order status";

/// Errors that can occur while advancing an order.
#[derive(Debug, Error)]
pub enum WorkflowError {
	/// Advance was requested for an order with no next status.
	#[error("Order {order_id} is {status} and cannot be advanced")]
	TerminalState { order_id: String, status: OrderStatus },
	/// The update request could not be completed.
	#[error("Transport error moving order {order_id} from {from} to {to}: {reason}")]
	Transport {
		order_id: String,
		from: OrderStatus,
		to: OrderStatus,
		reason: String,
	},
	/// The backend answered `success: false`.
	#[error(
		"Backend rejected moving order {order_id} from {from} to {to}: {}",
		.message.as_deref().unwrap_or("no message")
	)]
	ServiceRejected {
		order_id: String,
		from: OrderStatus,
		to: OrderStatus,
		message: Option<String>,
	},
	/// Another advance for the same order has not finished yet.
	#[error("An update for order {order_id} is already in progress")]
	AdvanceInFlight { order_id: String },
}

impl WorkflowError {
	pub fn order_id(&self) -> &str {
		match self {
			WorkflowError::TerminalState { order_id, .. }
			| WorkflowError::Transport { order_id, .. }
			| WorkflowError::ServiceRejected { order_id, .. }
			| WorkflowError::AdvanceInFlight { order_id } => order_id,
		}
	}

	/// Attempted target status, when a transition was attempted.
	pub fn attempted(&self) -> Option<OrderStatus> {
		match self {
			WorkflowError::Transport { to, .. } | WorkflowError::ServiceRejected { to, .. } => {
				Some(*to)
			},
			_ => None,
		}
	}

	/// Text for the notification surface.
	///
	/// Backend rejections show the backend's message when it sent one.
	pub fn user_message(&self) -> String {
		match self {
			WorkflowError::ServiceRejected {
				message: Some(message),
				..
			} if !message.trim().is_empty() => message.clone(),
			WorkflowError::ServiceRejected { .. } => GENERIC_FAILURE.to_string(),
			WorkflowError::Transport { .. } => format!("{}. Please try again.", GENERIC_FAILURE),
			WorkflowError::TerminalState { .. } => "This order has no further updates".to_string(),
			WorkflowError::AdvanceInFlight { .. } => {
				"An update for this order is already in progress".to_string()
			},
		}
	}
}

/// A transition confirmed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusAdvance {
	pub order_id: String,
	pub from: OrderStatus,
	pub to: OrderStatus,
	/// Acknowledgement text from the backend, if any.
	pub message: Option<String>,
}

/// Requests status transitions from the backend.
pub struct OrderWorkflow {
	backend: Arc<BackendService>,
}

impl OrderWorkflow {
	pub fn new(backend: Arc<BackendService>) -> Self {
		Self { backend }
	}

	/// Asks the backend to move `order_id` from `current` to its successor.
	///
	/// Sends exactly one request and never retries. Terminal statuses are
	/// refused before anything is sent.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id), from = %current))]
	pub async fn advance(
		&self,
		order_id: &str,
		current: OrderStatus,
	) -> Result<StatusAdvance, WorkflowError> {
		let Some(request) = status_update_for(current) else {
			tracing::warn!("Advance requested for terminal order");
			return Err(WorkflowError::TerminalState {
				order_id: order_id.to_string(),
				status: current,
			});
		};
		let to = request.status;

		match self.backend.update_status(order_id, &request).await {
			Ok(message) => {
				tracing::info!(to = %to, "Order status advanced");
				Ok(StatusAdvance {
					order_id: order_id.to_string(),
					from: current,
					to,
					message,
				})
			},
			Err(BackendError::Rejected { message }) => {
				tracing::warn!(to = %to, message = ?message, "Status update rejected");
				Err(WorkflowError::ServiceRejected {
					order_id: order_id.to_string(),
					from: current,
					to,
					message,
				})
			},
			Err(e) => {
				tracing::warn!(to = %to, error = %e, "Status update failed");
				Err(WorkflowError::Transport {
					order_id: order_id.to_string(),
					from: current,
					to,
					reason: e.to_string(),
				})
			},
		}
	}
}

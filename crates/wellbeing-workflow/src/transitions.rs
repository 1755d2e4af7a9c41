//! The forward transition table of the order status workflow.

use wellbeing_types::{OrderStatus, PaymentMethod, StatusUpdateRequest};

/// Label shown when an order cannot move any further.
pub const NO_FURTHER_UPDATES: &str = "No Further Updates";

/// Legal next status of an order and the action that leads there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextStatus {
	/// `None` for terminal and unrecognized statuses.
	pub next: Option<OrderStatus>,
	/// Forward action label, or [`NO_FURTHER_UPDATES`].
	pub label: &'static str,
}

impl NextStatus {
	pub const TERMINAL: NextStatus = NextStatus {
		next: None,
		label: NO_FURTHER_UPDATES,
	};

	const fn to(next: OrderStatus, label: &'static str) -> Self {
		Self {
			next: Some(next),
			label,
		}
	}

	pub fn is_terminal(&self) -> bool {
		self.next.is_none()
	}
}

/// Returns the unique successor of `current`.
pub fn next_status(current: OrderStatus) -> NextStatus {
	match current {
		OrderStatus::Placed => NextStatus::to(OrderStatus::Processing, "Update Order to Processing"),
		OrderStatus::Processing => {
			NextStatus::to(OrderStatus::Completed, "Update Order to Completed")
		},
		OrderStatus::Completed => {
			NextStatus::to(OrderStatus::Delivered, "Update Order to Delivered")
		},
		OrderStatus::Delivered => {
			NextStatus::to(OrderStatus::ReadyToPickup, "Update Order to Ready to Pickup")
		},
		OrderStatus::ReadyToPickup => NextStatus::TERMINAL,
	}
}

/// Same as [`next_status`] for a status string that has not been validated.
///
/// Unrecognized values have no successor.
pub fn next_status_for(raw: &str) -> NextStatus {
	raw.parse::<OrderStatus>()
		.map(next_status)
		.unwrap_or(NextStatus::TERMINAL)
}

/// Builds the update request that moves an order one step forward.
///
/// Only `processing -> completed` carries a payment method.
pub fn status_update_for(current: OrderStatus) -> Option<StatusUpdateRequest> {
	let next = next_status(current).next?;
	let payment_method = match (current, next) {
		(OrderStatus::Processing, OrderStatus::Completed) => Some(PaymentMethod::Online),
		_ => None,
	};
	Some(StatusUpdateRequest {
		status: next,
		payment_method,
	})
}

//! Presentation of an order's status as stepper progress and action labels.
//!
//! Everything here is a pure function of the order; nothing talks to the
//! backend.

use crate::transitions::next_status_for;
use crate::next_status;
use wellbeing_types::{Order, OrderStatus};

/// Zero-based position of `status` in the fixed five-step flow.
pub fn progress_index(status: OrderStatus) -> usize {
	status.position()
}

/// Progress index of a raw status string; `0` when it is not recognized.
pub fn progress_index_for(raw: &str) -> usize {
	raw.parse::<OrderStatus>().map(progress_index).unwrap_or(0)
}

/// Whether step `index` is shown as reached for an order in `current`.
pub fn is_reached(current: OrderStatus, index: usize) -> bool {
	progress_index(current) >= index
}

/// Forward action label for `status`, or the disabled label at the end.
pub fn action_label(status: OrderStatus) -> &'static str {
	next_status(status).label
}

pub fn action_label_for(raw: &str) -> &'static str {
	next_status_for(raw).label
}

/// One position of the order stepper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
	pub label: String,
	pub reached: bool,
}

/// Builds the stepper for an order.
///
/// Positions are labelled from the order's `status_flow`; an empty flow falls
/// back to the five known statuses. Which positions are reached depends only
/// on the current status.
pub fn stepper(order: &Order) -> Vec<Step> {
	let labels: Vec<String> = if order.status_flow.is_empty() {
		OrderStatus::ALL
			.iter()
			.map(|status| status.display_name().to_string())
			.collect()
	} else {
		order.status_flow.iter().map(|name| step_name(name)).collect()
	};

	labels
		.into_iter()
		.enumerate()
		.map(|(index, name)| Step {
			label: format!("Order {}", name),
			reached: is_reached(order.order_status, index),
		})
		.collect()
}

/// Human name of a status_flow entry, keeping unknown names readable.
fn step_name(raw: &str) -> String {
	if let Ok(status) = raw.parse::<OrderStatus>() {
		return status.display_name().to_string();
	}

	let spaced = raw.trim().replace('_', " ");
	let mut chars = spaced.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => spaced,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_progress_index_is_monotonic() {
		let indices: Vec<usize> = OrderStatus::ALL.iter().map(|s| progress_index(*s)).collect();
		assert_eq!(indices, vec![0, 1, 2, 3, 4]);
		assert!(indices.windows(2).all(|w| w[0] <= w[1]));
	}

	#[test]
	fn test_progress_index_for_unknown_is_zero() {
		assert_eq!(progress_index_for("arrived"), 0);
		assert_eq!(progress_index_for("delivered"), 3);
		assert_eq!(progress_index_for("ready to pickup"), 4);
	}

	#[test]
	fn test_action_labels() {
		assert_eq!(action_label(OrderStatus::Placed), "Update Order to Processing");
		assert_eq!(action_label(OrderStatus::ReadyToPickup), "No Further Updates");
		assert_eq!(action_label_for("bogus"), "No Further Updates");
	}

	#[test]
	fn test_stepper_default_flow() {
		let order = Order {
			order_status: OrderStatus::Completed,
			..Order::placed("1")
		};
		let steps = stepper(&order);
		assert_eq!(steps.len(), 5);
		assert_eq!(steps[0].label, "Order Placed");
		assert_eq!(steps[4].label, "Order Ready to Pickup");
		let reached: Vec<bool> = steps.iter().map(|s| s.reached).collect();
		assert_eq!(reached, vec![true, true, true, false, false]);
	}

	#[test]
	fn test_stepper_uses_status_flow_labels() {
		let order = Order {
			status_flow: vec!["placed".into(), "packed".into(), "handed_over".into()],
			..Order::placed("2")
		};
		let steps = stepper(&order);
		let labels: Vec<&str> = steps.iter().map(|s| s.label.as_str()).collect();
		assert_eq!(labels, vec!["Order Placed", "Order Packed", "Order Handed over"]);
		assert!(steps[0].reached);
		assert!(!steps[1].reached);
	}
}

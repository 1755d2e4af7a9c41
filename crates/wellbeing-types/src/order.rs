//! Pharmacy order types.
//!
//! An order is owned by the backend; the client only ever holds a
//! read-through copy that is replaced after every confirmed status change.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::utils::conversion::{id_string, optional_decimal, optional_id_string};

/// Returned when a status string is not one of the five known order states.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown order status: {0}")]
pub struct UnknownStatus(pub String);

/// Fulfilment status of a pharmacy order.
///
/// The variants are declared in fulfilment order, so the derived `Ord`
/// matches the direction an order moves in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	/// Order has been created by the employee and assigned to the pharmacy.
	Placed,
	/// Pharmacy is preparing the order.
	Processing,
	/// Order has been prepared and paid for.
	Completed,
	/// Order has been handed to delivery.
	Delivered,
	/// Order is waiting at the pickup point.
	ReadyToPickup,
}

impl OrderStatus {
	/// Every status in fulfilment order.
	pub const ALL: [OrderStatus; 5] = [
		OrderStatus::Placed,
		OrderStatus::Processing,
		OrderStatus::Completed,
		OrderStatus::Delivered,
		OrderStatus::ReadyToPickup,
	];

	/// Wire name of the status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Placed => "placed",
			OrderStatus::Processing => "processing",
			OrderStatus::Completed => "completed",
			OrderStatus::Delivered => "delivered",
			OrderStatus::ReadyToPickup => "ready_to_pickup",
		}
	}

	/// Human-facing name used in labels and the stepper.
	pub fn display_name(&self) -> &'static str {
		match self {
			OrderStatus::Placed => "Placed",
			OrderStatus::Processing => "Processing",
			OrderStatus::Completed => "Completed",
			OrderStatus::Delivered => "Delivered",
			OrderStatus::ReadyToPickup => "Ready to Pickup",
		}
	}

	/// Position of the status in the fulfilment sequence.
	pub fn position(&self) -> usize {
		*self as usize
	}

	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::ReadyToPickup)
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Parses wire names case-insensitively; spaces and hyphens are read as
/// underscores so "Ready to pickup" resolves as well.
impl FromStr for OrderStatus {
	type Err = UnknownStatus;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let normalized: String = s
			.trim()
			.chars()
			.map(|c| match c {
				' ' | '-' => '_',
				c => c.to_ascii_lowercase(),
			})
			.collect();

		OrderStatus::ALL
			.into_iter()
			.find(|status| status.as_str() == normalized)
			.ok_or_else(|| UnknownStatus(s.to_string()))
	}
}

impl<'de> Deserialize<'de> for OrderStatus {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;
		raw.parse().map_err(serde::de::Error::custom)
	}
}

/// Payment method attached to the `processing -> completed` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
	Online,
}

impl fmt::Display for PaymentMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PaymentMethod::Online => write!(f, "online"),
		}
	}
}

/// Body of `PUT /orders/{order_id}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
	/// Status the order should move to.
	pub status: OrderStatus,
	/// Only present for the `processing -> completed` transition.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub payment_method: Option<PaymentMethod>,
}

/// A single medicine line on an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
	#[serde(default, deserialize_with = "optional_id_string")]
	pub item_id: Option<String>,
	#[serde(default, deserialize_with = "optional_id_string")]
	pub medicine_id: Option<String>,
	/// Missing for medicines sourced from an outdoor pharmacy.
	#[serde(default)]
	pub medicine_name: Option<String>,
	#[serde(default)]
	pub quantity_requested: u32,
	/// True when the medicine comes from internal inventory.
	#[serde(default)]
	pub from_inventory: bool,
	#[serde(default)]
	pub stock_status: Option<String>,
}

impl OrderItem {
	/// Name shown for the line, falling back for outdoor medicines.
	pub fn display_name(&self) -> &str {
		self.medicine_name.as_deref().unwrap_or("Outdoor Medicine")
	}

	pub fn source_label(&self) -> &'static str {
		if self.from_inventory {
			"Inventory"
		} else {
			"Outdoor Pharmacy"
		}
	}
}

/// Client-side copy of a pharmacy order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
	/// Backend identifier; numeric ids are normalised to strings.
	#[serde(deserialize_with = "id_string")]
	pub order_id: String,
	/// Current status, validated on decode.
	pub order_status: OrderStatus,
	/// Status names labelling the stepper positions for this order.
	#[serde(default)]
	pub status_flow: Vec<String>,
	#[serde(default)]
	pub items: Vec<OrderItem>,
	/// Set by the backend once the order has been paid for.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub payment_method: Option<String>,
	#[serde(default)]
	pub employee_no: Option<String>,
	#[serde(default)]
	pub pharmacy_type: Option<String>,
	#[serde(default)]
	pub delivery_type: Option<String>,
	#[serde(default)]
	pub placed_date: Option<String>,
	#[serde(default)]
	pub notes: Option<String>,
	#[serde(default, deserialize_with = "optional_decimal")]
	pub total_price: Option<f64>,
}

impl Order {
	/// Creates a freshly placed order with no items.
	pub fn placed(order_id: impl Into<String>) -> Self {
		Self {
			order_id: order_id.into(),
			order_status: OrderStatus::Placed,
			status_flow: Vec::new(),
			items: Vec::new(),
			payment_method: None,
			employee_no: None,
			pharmacy_type: None,
			delivery_type: None,
			placed_date: None,
			notes: None,
			total_price: None,
		}
	}

	/// Case-insensitive substring match on the employee number.
	pub fn matches_employee(&self, term: &str) -> bool {
		let term = term.trim().to_lowercase();
		if term.is_empty() {
			return true;
		}
		self.employee_no
			.as_deref()
			.is_some_and(|no| no.to_lowercase().contains(&term))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_status_wire_names() {
		for status in OrderStatus::ALL {
			let encoded = serde_json::to_value(status).unwrap();
			assert_eq!(encoded, json!(status.as_str()));
		}
		assert_eq!(
			serde_json::to_value(OrderStatus::ReadyToPickup).unwrap(),
			json!("ready_to_pickup")
		);
	}

	#[test]
	fn test_status_parsing_is_lenient_about_case_and_separators() {
		assert_eq!("Processing".parse(), Ok(OrderStatus::Processing));
		assert_eq!(" ready to pickup ".parse(), Ok(OrderStatus::ReadyToPickup));
		assert_eq!("ready-to-pickup".parse(), Ok(OrderStatus::ReadyToPickup));
		assert_eq!(
			"shipped".parse::<OrderStatus>(),
			Err(UnknownStatus("shipped".to_string()))
		);
	}

	#[test]
	fn test_positions_follow_fulfilment_order() {
		let positions: Vec<usize> = OrderStatus::ALL.iter().map(|s| s.position()).collect();
		assert_eq!(positions, vec![0, 1, 2, 3, 4]);
		assert!(OrderStatus::Placed < OrderStatus::ReadyToPickup);
		assert!(OrderStatus::ReadyToPickup.is_terminal());
		assert!(!OrderStatus::Delivered.is_terminal());
	}

	#[test]
	fn test_update_request_omits_absent_payment_method() {
		let plain = StatusUpdateRequest {
			status: OrderStatus::Processing,
			payment_method: None,
		};
		assert_eq!(serde_json::to_value(&plain).unwrap(), json!({"status": "processing"}));

		let paid = StatusUpdateRequest {
			status: OrderStatus::Completed,
			payment_method: Some(PaymentMethod::Online),
		};
		assert_eq!(
			serde_json::to_value(&paid).unwrap(),
			json!({"status": "completed", "payment_method": "online"})
		);
	}

	#[test]
	fn test_order_decodes_backend_shape() {
		let raw = json!({
			"order_id": 42,
			"order_status": "Delivered",
			"status_flow": ["placed", "processing", "completed", "delivered", "ready_to_pickup"],
			"employee_no": "EMP-007",
			"total_price": "19.5",
			"items": [
				{"item_id": 1, "medicine_id": 9, "medicine_name": "Paracetamol", "quantity_requested": 2, "from_inventory": true},
				{"item_id": 2, "quantity_requested": 1}
			]
		});

		let order: Order = serde_json::from_value(raw).unwrap();
		assert_eq!(order.order_id, "42");
		assert_eq!(order.order_status, OrderStatus::Delivered);
		assert_eq!(order.total_price, Some(19.5));
		assert_eq!(order.items[0].medicine_id.as_deref(), Some("9"));
		assert_eq!(order.items[0].source_label(), "Inventory");
		assert_eq!(order.items[1].display_name(), "Outdoor Medicine");
		assert_eq!(order.items[1].source_label(), "Outdoor Pharmacy");
	}

	#[test]
	fn test_order_rejects_unknown_status() {
		let raw = json!({"order_id": "A1", "order_status": "en route"});
		let err = serde_json::from_value::<Order>(raw).unwrap_err();
		assert!(err.to_string().contains("Unknown order status"));
	}

	#[test]
	fn test_matches_employee() {
		let mut order = Order::placed("1");
		order.employee_no = Some("EMP-1234".to_string());
		assert!(order.matches_employee("emp-12"));
		assert!(order.matches_employee(""));
		assert!(!order.matches_employee("999"));
		assert!(!Order::placed("2").matches_employee("emp"));
	}
}

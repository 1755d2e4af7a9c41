//! Response envelope and lookup types of the pharmacy HTTP API.
//!
//! Every backend endpoint answers with `{ "success": bool, "message"?, "data"? }`.

use serde::{Deserialize, Serialize};

use crate::Order;

/// Envelope wrapping every backend response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
	/// Whether the backend accepted the request.
	pub success: bool,
	/// Backend-provided explanation, usually present on failure.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	/// Payload on success.
	#[serde(default = "none", skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
}

fn none<T>() -> Option<T> {
	None
}

impl<T> ApiResponse<T> {
	/// Successful response carrying `data`.
	pub fn ok(data: T) -> Self {
		Self {
			success: true,
			message: None,
			data: Some(data),
		}
	}

	/// Failed response with an optional message.
	pub fn rejected(message: Option<String>) -> Self {
		Self {
			success: false,
			message,
			data: None,
		}
	}
}

/// Employee details returned with the employee order lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Employee {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub nic: String,
	#[serde(default)]
	pub designation: String,
	#[serde(default)]
	pub department: String,
}

/// Payload of `GET /oder/orders-by-employee`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeOrders {
	pub employee: Employee,
	#[serde(default)]
	pub orders: Vec<Order>,
}

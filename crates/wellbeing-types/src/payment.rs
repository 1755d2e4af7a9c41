//! Payment records listed on the payments screen.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::utils::conversion::{id_string, optional_decimal, optional_id_string};

/// Settlement state of a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
	Paid,
	Pending,
	Failed,
	/// Any other label the backend reports, kept verbatim.
	Other(String),
}

impl PaymentStatus {
	pub fn as_str(&self) -> &str {
		match self {
			PaymentStatus::Paid => "paid",
			PaymentStatus::Pending => "pending",
			PaymentStatus::Failed => "failed",
			PaymentStatus::Other(label) => label,
		}
	}
}

impl From<&str> for PaymentStatus {
	fn from(label: &str) -> Self {
		match label.trim().to_lowercase().as_str() {
			"paid" => PaymentStatus::Paid,
			"pending" => PaymentStatus::Pending,
			"failed" => PaymentStatus::Failed,
			_ => PaymentStatus::Other(label.to_string()),
		}
	}
}

impl fmt::Display for PaymentStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Serialize for PaymentStatus {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for PaymentStatus {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;
		Ok(PaymentStatus::from(raw.as_str()))
	}
}

/// A payment made against a pharmacy order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
	#[serde(deserialize_with = "id_string")]
	pub payment_id: String,
	#[serde(default)]
	pub employee_no: String,
	#[serde(default)]
	pub employee_name: Option<String>,
	#[serde(default, deserialize_with = "optional_id_string")]
	pub order_id: Option<String>,
	#[serde(default, deserialize_with = "optional_decimal")]
	pub amount: Option<f64>,
	#[serde(default)]
	pub payment_method: Option<String>,
	pub payment_status: PaymentStatus,
	#[serde(default)]
	pub payment_date: Option<String>,
}

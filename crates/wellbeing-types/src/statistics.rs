//! Raw dashboard statistics from `GET /oder/get-statistics`.

use serde::{Deserialize, Serialize};

use crate::utils::conversion::{optional_count, optional_decimal};

/// Order count for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyOrders {
	#[serde(default)]
	pub day: String,
	#[serde(default, deserialize_with = "optional_count")]
	pub total_orders: Option<u64>,
}

/// Income for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyIncome {
	#[serde(default)]
	pub day: String,
	#[serde(default, deserialize_with = "optional_decimal")]
	pub income: Option<f64>,
}

/// A medicine referenced by a statistics entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicineRef {
	#[serde(default)]
	pub medicine_name: Option<String>,
}

/// Statistics exactly as reported by the backend; every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStatistics {
	#[serde(default)]
	pub orders_per_day: Option<Vec<DailyOrders>>,
	#[serde(default)]
	pub income_per_day: Option<Vec<DailyIncome>>,
	#[serde(default)]
	pub top_inventory_item: Option<MedicineRef>,
	#[serde(default)]
	pub most_out_of_stock_item: Option<MedicineRef>,
	#[serde(default, deserialize_with = "optional_count")]
	pub inventory_count: Option<u64>,
	#[serde(default, deserialize_with = "optional_count")]
	pub total_prescriptions: Option<u64>,
	#[serde(default, deserialize_with = "optional_count")]
	pub payment_success_count: Option<u64>,
}

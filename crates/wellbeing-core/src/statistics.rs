//! Statistics dashboard: reduces raw backend statistics to display values.

use wellbeing_types::{DailyOrders, RawStatistics};

/// Shown for any value the backend did not report.
pub const MISSING: &str = "-";

/// Dashboard figures for one day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsSummary {
	/// Sum of orders over the reported days.
	pub total_orders: Option<u64>,
	/// Sum of income over the reported days.
	pub total_income: Option<f64>,
	pub top_inventory_item: Option<String>,
	pub most_out_of_stock_item: Option<String>,
	pub inventory_count: Option<u64>,
	pub total_prescriptions: Option<u64>,
	pub payment_success_count: Option<u64>,
	/// Per-day order counts as reported.
	pub recent_orders: Vec<DailyOrders>,
}

impl StatisticsSummary {
	pub fn summarize(raw: &RawStatistics) -> Self {
		let total_orders = raw
			.orders_per_day
			.as_ref()
			.map(|days| days.iter().filter_map(|d| d.total_orders).sum());
		let total_income = raw
			.income_per_day
			.as_ref()
			.map(|days| days.iter().filter_map(|d| d.income).sum());
		let medicine_name = |item: &Option<wellbeing_types::MedicineRef>| {
			item.as_ref()
				.and_then(|i| i.medicine_name.clone())
				.filter(|name| !name.trim().is_empty())
		};

		Self {
			total_orders,
			total_income,
			top_inventory_item: medicine_name(&raw.top_inventory_item),
			most_out_of_stock_item: medicine_name(&raw.most_out_of_stock_item),
			inventory_count: raw.inventory_count,
			total_prescriptions: raw.total_prescriptions,
			payment_success_count: raw.payment_success_count,
			recent_orders: raw.orders_per_day.clone().unwrap_or_default(),
		}
	}

	/// Label and display value of every dashboard card.
	pub fn cards(&self) -> Vec<(&'static str, String)> {
		vec![
			("Total Orders", display(self.total_orders)),
			(
				"Total Income",
				self.total_income
					.map(|income| format!("{:.2}", income))
					.unwrap_or_else(|| MISSING.to_string()),
			),
			("Top Inventory Item", display(self.top_inventory_item.as_deref())),
			(
				"Most Out of Stock Item",
				display(self.most_out_of_stock_item.as_deref()),
			),
			("Inventory Count", display(self.inventory_count)),
			("Total Prescriptions", display(self.total_prescriptions)),
			("Successful Payments", display(self.payment_success_count)),
		]
	}
}

fn display<T: std::fmt::Display>(value: Option<T>) -> String {
	value
		.map(|v| v.to_string())
		.unwrap_or_else(|| MISSING.to_string())
}

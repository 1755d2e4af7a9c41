//! CSV export of an employee's orders.

use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use wellbeing_types::{date_part, Order};

#[derive(Debug, Error)]
pub enum ExportError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("CSV error: {0}")]
	Csv(#[from] csv::Error),
	#[error("Invalid employee number '{0}'")]
	InvalidEmployee(String),
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
	#[serde(rename = "Order ID")]
	order_id: &'a str,
	#[serde(rename = "Pharmacy Type")]
	pharmacy_type: &'a str,
	#[serde(rename = "Delivery Type")]
	delivery_type: &'a str,
	#[serde(rename = "Status")]
	status: &'a str,
	#[serde(rename = "Placed Date")]
	placed_date: &'a str,
	#[serde(rename = "Notes")]
	notes: &'a str,
	#[serde(rename = "Items")]
	items: String,
}

impl<'a> ExportRow<'a> {
	fn from_order(order: &'a Order) -> Self {
		let items = order
			.items
			.iter()
			.map(|item| format!("{} × {}", item.display_name(), item.quantity_requested))
			.collect::<Vec<_>>()
			.join(" | ");

		Self {
			order_id: &order.order_id,
			pharmacy_type: order.pharmacy_type.as_deref().unwrap_or_default(),
			delivery_type: order.delivery_type.as_deref().unwrap_or_default(),
			status: order.order_status.as_str(),
			placed_date: date_part(order.placed_date.as_deref()),
			notes: order.notes.as_deref().unwrap_or_default(),
			items,
		}
	}
}

/// File name the export of `employee_no` is written to.
pub fn export_file_name(employee_no: &str) -> Result<String, ExportError> {
	let employee_no = employee_no.trim();
	let valid = !employee_no.is_empty()
		&& employee_no
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
		&& !employee_no.starts_with('.');
	if !valid {
		return Err(ExportError::InvalidEmployee(employee_no.to_string()));
	}
	Ok(format!("employee_orders_{}.csv", employee_no))
}

/// Writes `orders` to `employee_orders_<employee_no>.csv` in `directory`.
///
/// Every field is quoted. Returns the path of the written file.
pub fn export_employee_orders(
	orders: &[Order],
	employee_no: &str,
	directory: &Path,
) -> Result<PathBuf, ExportError> {
	let path = directory.join(export_file_name(employee_no)?);
	std::fs::create_dir_all(directory)?;

	let mut writer = WriterBuilder::new()
		.quote_style(QuoteStyle::Always)
		.from_path(&path)?;
	if orders.is_empty() {
		writer.write_record([
			"Order ID",
			"Pharmacy Type",
			"Delivery Type",
			"Status",
			"Placed Date",
			"Notes",
			"Items",
		])?;
	}
	for order in orders {
		writer.serialize(ExportRow::from_order(order))?;
	}
	writer.flush()?;

	tracing::info!(path = %path.display(), rows = orders.len(), "Exported employee orders");
	Ok(path)
}

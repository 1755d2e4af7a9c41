//! Plain-text rendering of the pharmacy screens.

use std::fmt::Write;
use wellbeing_core::{OrderView, StatisticsSummary};
use wellbeing_types::{
	date_part, format_currency, EmployeeOrders, Order, Payment, WorkflowEvent,
};
use wellbeing_workflow::action_label;

fn or_dash(value: Option<&str>) -> &str {
	value.filter(|v| !v.is_empty()).unwrap_or("-")
}

/// One line per order.
pub fn order_table(orders: &[Order]) -> String {
	if orders.is_empty() {
		return "No orders found.\n".to_string();
	}

	let mut out = format!(
		"{:<10} {:<12} {:<16} {:<12} {}\n",
		"ORDER", "EMPLOYEE", "STATUS", "PLACED", "NEXT ACTION"
	);
	for order in orders {
		let _ = writeln!(
			out,
			"{:<10} {:<12} {:<16} {:<12} {}",
			order.order_id,
			or_dash(order.employee_no.as_deref()),
			order.order_status.display_name(),
			or_dash(Some(date_part(order.placed_date.as_deref()))),
			action_label(order.order_status),
		);
	}
	out
}

/// Details of one order with its stepper.
pub fn order_details(view: &OrderView) -> String {
	let order = &view.order;
	let mut out = format!("Order #{}\n\n", order.order_id);

	for step in &view.steps {
		let mark = if step.reached { "x" } else { " " };
		let _ = writeln!(out, "  [{}] {}", mark, step.label);
	}

	let _ = writeln!(out);
	let _ = writeln!(out, "Employee No:   {}", or_dash(order.employee_no.as_deref()));
	let _ = writeln!(out, "Pharmacy Type: {}", or_dash(order.pharmacy_type.as_deref()));
	let _ = writeln!(out, "Delivery Type: {}", or_dash(order.delivery_type.as_deref()));
	let _ = writeln!(out, "Order Status:  {}", order.order_status);
	let _ = writeln!(out, "Notes:         {}", or_dash(order.notes.as_deref()));

	let _ = writeln!(out, "\nOrdered Medicines:");
	if order.items.is_empty() {
		let _ = writeln!(out, "  (none)");
	}
	for item in &order.items {
		let _ = writeln!(
			out,
			"  - {} x{} ({}{})",
			item.display_name(),
			item.quantity_requested,
			item.source_label(),
			item.stock_status
				.as_deref()
				.map(|s| format!(", {}", s))
				.unwrap_or_default(),
		);
	}

	let action = if view.in_flight {
		format!("{} (in progress)", view.action_label)
	} else if view.can_advance {
		view.action_label.to_string()
	} else {
		format!("{} (disabled)", view.action_label)
	};
	let _ = writeln!(out, "\nAction: {}", action);
	out
}

pub fn employee_orders(found: &EmployeeOrders) -> String {
	let employee = &found.employee;
	let mut out = String::new();
	let _ = writeln!(out, "Name:        {}", or_dash(Some(employee.name.as_str())));
	let _ = writeln!(out, "NIC:         {}", or_dash(Some(employee.nic.as_str())));
	let _ = writeln!(out, "Designation: {}", or_dash(Some(employee.designation.as_str())));
	let _ = writeln!(out, "Department:  {}", or_dash(Some(employee.department.as_str())));
	let _ = writeln!(out);

	for order in &found.orders {
		let items = order
			.items
			.iter()
			.map(|item| format!("{} × {}", item.display_name(), item.quantity_requested))
			.collect::<Vec<_>>()
			.join(", ");
		let _ = writeln!(
			out,
			"#{} {} {} [{}] {}",
			order.order_id,
			or_dash(Some(date_part(order.placed_date.as_deref()))),
			order.order_status.display_name(),
			or_dash(order.delivery_type.as_deref()),
			items,
		);
	}
	if found.orders.is_empty() {
		let _ = writeln!(out, "No orders found.");
	}
	out
}

pub fn payment_table(payments: &[&Payment]) -> String {
	if payments.is_empty() {
		return "No payments found.\n".to_string();
	}

	let mut out = format!(
		"{:<8} {:<12} {:<20} {:<8} {:>10} {:<8} {:<10} {}\n",
		"PAYMENT", "EMPLOYEE", "NAME", "ORDER", "AMOUNT", "METHOD", "STATUS", "DATE"
	);
	for payment in payments {
		let _ = writeln!(
			out,
			"{:<8} {:<12} {:<20} {:<8} {:>10} {:<8} {:<10} {}",
			payment.payment_id,
			or_dash(Some(payment.employee_no.as_str())),
			or_dash(payment.employee_name.as_deref()),
			or_dash(payment.order_id.as_deref()),
			format_currency(payment.amount),
			or_dash(payment.payment_method.as_deref()),
			payment.payment_status.as_str(),
			or_dash(Some(date_part(payment.payment_date.as_deref()))),
		);
	}
	out
}

pub fn statistics(summary: &StatisticsSummary) -> String {
	let mut out = String::new();
	for (label, value) in summary.cards() {
		let _ = writeln!(out, "{:<24} {}", label, value);
	}

	let _ = writeln!(out, "\nRecent Orders:");
	if summary.recent_orders.is_empty() {
		let _ = writeln!(out, "  -");
	}
	for day in &summary.recent_orders {
		let total = day
			.total_orders
			.map(|n| n.to_string())
			.unwrap_or_else(|| "-".to_string());
		let _ = writeln!(out, "  {}  {}", date_part(Some(day.day.as_str())), total);
	}
	out
}

/// A workflow event as a one-line notification.
pub fn toast(event: &WorkflowEvent) -> String {
	match event {
		WorkflowEvent::StatusAdvanced { order_id, to, .. } => {
			format!("[ok] Order #{} updated to {}", order_id, to.display_name())
		},
		WorkflowEvent::AdvanceFailed {
			order_id, reason, ..
		} => format!("[error] Order #{}: {}", order_id, reason),
	}
}

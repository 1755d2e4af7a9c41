//! Payments screen: fetched payment records with a search box and status tabs.

use crate::BoardError;
use std::fmt;
use std::str::FromStr;
use wellbeing_client::BackendService;
use wellbeing_types::{Payment, PaymentStatus};

/// Status tab of the payments screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusTab {
	#[default]
	All,
	Paid,
	Pending,
	Failed,
}

impl StatusTab {
	pub const ALL: [StatusTab; 4] = [
		StatusTab::All,
		StatusTab::Paid,
		StatusTab::Pending,
		StatusTab::Failed,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			StatusTab::All => "All",
			StatusTab::Paid => "Paid",
			StatusTab::Pending => "Pending",
			StatusTab::Failed => "Failed",
		}
	}

	pub fn matches(&self, status: &PaymentStatus) -> bool {
		match self {
			StatusTab::All => true,
			tab => status.as_str().eq_ignore_ascii_case(tab.as_str()),
		}
	}
}

impl fmt::Display for StatusTab {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for StatusTab {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		StatusTab::ALL
			.into_iter()
			.find(|tab| tab.as_str().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| format!("Unknown payment status tab '{}'", s))
	}
}

/// Payments fetched from the backend.
#[derive(Debug, Clone, Default)]
pub struct PaymentsView {
	payments: Vec<Payment>,
}

impl PaymentsView {
	pub fn new(payments: Vec<Payment>) -> Self {
		Self { payments }
	}

	pub async fn load(backend: &BackendService) -> Result<Self, BoardError> {
		let payments = backend
			.list_payments()
			.await
			.map_err(|e| BoardError::Backend(e.to_string()))?;
		Ok(Self::new(payments))
	}

	pub fn payments(&self) -> &[Payment] {
		&self.payments
	}

	/// Payments matching the employee search term and the status tab.
	///
	/// Both comparisons ignore case; an empty term matches everything.
	pub fn filter(&self, term: &str, tab: StatusTab) -> Vec<&Payment> {
		let term = term.trim().to_lowercase();
		self.payments
			.iter()
			.filter(|p| term.is_empty() || p.employee_no.to_lowercase().contains(&term))
			.filter(|p| tab.matches(&p.payment_status))
			.collect()
	}
}

//! Backend client module for the Wellbeing-360 pharmacy client.
//!
//! This module abstracts the pharmacy REST backend behind
//! [`BackendInterface`]. The `http` implementation talks to the real service;
//! the `memory` implementation keeps orders in process and is used for tests
//! and offline demos.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;
use tracing::instrument;
use wellbeing_config::BackendConfig;
use wellbeing_types::{
	truncate_id, ConfigSchema, EmployeeOrders, ImplementationRegistry, Order, Payment,
	RawStatistics, StatusUpdateRequest,
};

/// Re-export implementations
pub mod implementations {
	pub mod http;
	pub mod memory;
}

/// Errors that can occur while talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
	/// The request could not be completed.
	#[error("Network error: {0}")]
	Network(String),
	/// The backend answered with `success: false`.
	#[error("Rejected by backend: {}", .message.as_deref().unwrap_or("no message"))]
	Rejected { message: Option<String> },
	/// The response body was not the expected envelope.
	#[error("Decode error: {0}")]
	Decode(String),
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Operations offered by the pharmacy backend.
#[async_trait]
pub trait BackendInterface: Send + Sync {
	/// Returns the configuration schema for this implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Lists every order known to the pharmacy.
	async fn list_orders(&self) -> Result<Vec<Order>, BackendError>;

	/// Fetches one order including its line items.
	async fn get_order(&self, order_id: &str) -> Result<Order, BackendError>;

	/// Fetches an employee together with all of their orders.
	async fn orders_by_employee(&self, employee_no: &str)
		-> Result<EmployeeOrders, BackendError>;

	async fn list_payments(&self) -> Result<Vec<Payment>, BackendError>;

	/// Fetches dashboard statistics for the given day.
	async fn get_statistics(&self, date: NaiveDate) -> Result<RawStatistics, BackendError>;

	/// Requests a status change for an order.
	///
	/// Returns the backend's message, if any, once the change is acknowledged.
	async fn update_status(
		&self,
		order_id: &str,
		request: &StatusUpdateRequest,
	) -> Result<Option<String>, BackendError>;
}

/// Signature every backend implementation exposes to build itself.
///
/// Receives the implementation's own table and the surrounding backend section.
pub type BackendFactory =
	fn(&toml::Value, &BackendConfig) -> Result<Box<dyn BackendInterface>, BackendError>;

/// Registry trait for backend implementations.
pub trait BackendRegistry: ImplementationRegistry<Factory = BackendFactory> {}

/// All registered backend implementations as (name, factory) pairs.
pub fn get_all_implementations() -> Vec<(&'static str, BackendFactory)> {
	use implementations::{http, memory};

	vec![
		(http::Registry::NAME, http::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// Service wrapping the configured backend implementation.
pub struct BackendService {
	backend: Box<dyn BackendInterface>,
}

impl BackendService {
	pub fn new(backend: Box<dyn BackendInterface>) -> Self {
		Self { backend }
	}

	/// Builds the primary implementation named in the backend configuration.
	///
	/// The implementation's table is validated against its schema first.
	pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
		let factories: HashMap<&str, BackendFactory> =
			get_all_implementations().into_iter().collect();

		let factory = factories.get(config.primary.as_str()).ok_or_else(|| {
			BackendError::Configuration(format!(
				"Unknown backend implementation '{}'",
				config.primary
			))
		})?;
		let table = config.primary_config().ok_or_else(|| {
			BackendError::Configuration(format!(
				"Missing [backend.implementations.{}] section",
				config.primary
			))
		})?;

		let backend = factory(table, config)?;
		backend
			.config_schema()
			.validate(table)
			.map_err(|e| BackendError::Configuration(e.to_string()))?;

		tracing::info!(component = "backend", implementation = %config.primary, "Loaded");
		Ok(Self::new(backend))
	}

	pub async fn list_orders(&self) -> Result<Vec<Order>, BackendError> {
		let orders = self.backend.list_orders().await?;
		tracing::debug!(count = orders.len(), "Fetched orders");
		Ok(orders)
	}

	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn get_order(&self, order_id: &str) -> Result<Order, BackendError> {
		self.backend.get_order(order_id).await
	}

	pub async fn orders_by_employee(
		&self,
		employee_no: &str,
	) -> Result<EmployeeOrders, BackendError> {
		self.backend.orders_by_employee(employee_no.trim()).await
	}

	pub async fn list_payments(&self) -> Result<Vec<Payment>, BackendError> {
		self.backend.list_payments().await
	}

	pub async fn get_statistics(&self, date: NaiveDate) -> Result<RawStatistics, BackendError> {
		self.backend.get_statistics(date).await
	}

	#[instrument(skip_all, fields(order_id = %truncate_id(order_id), status = %request.status))]
	pub async fn update_status(
		&self,
		order_id: &str,
		request: &StatusUpdateRequest,
	) -> Result<Option<String>, BackendError> {
		self.backend.update_status(order_id, request).await
	}
}

//! In-memory backend implementation.
//!
//! Holds orders, payments and statistics in process and applies status
//! changes with the same successor rule the pharmacy service enforces. Used
//! for tests and offline demos; cloned handles share state, so a test can
//! keep one handle for scripting after boxing another into a service.
//!
//! Configuration parameters (`[backend.implementations.memory]`):
//! - `fixture` - JSON file with `orders`, `payments`, `employees` and
//!   `statistics` to start from (optional). A relative path is taken from
//!   the configuration file's directory.

use crate::{BackendError, BackendFactory, BackendInterface, BackendRegistry};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use wellbeing_config::BackendConfig;
use wellbeing_types::{
	ConfigSchema, Employee, EmployeeOrders, Field, FieldType, ImplementationRegistry, Order,
	OrderStatus, Payment, RawStatistics, Schema, StatusUpdateRequest, ValidationError,
};

/// Outcome forced on the next update of an order.
#[derive(Debug, Clone)]
enum ScriptedFailure {
	Reject(Option<String>),
	Network(String),
}

#[derive(Debug, Default)]
struct MemoryState {
	orders: Vec<Order>,
	employees: HashMap<String, Employee>,
	payments: Vec<Payment>,
	statistics: HashMap<NaiveDate, RawStatistics>,
	scripted: HashMap<String, ScriptedFailure>,
	failed_reads: HashMap<String, String>,
	read_delay: Option<Duration>,
	updates: Vec<(String, StatusUpdateRequest)>,
}

/// Starting data for a memory backend.
#[derive(Debug, Default, Deserialize)]
pub struct MemoryFixture {
	#[serde(default)]
	pub orders: Vec<Order>,
	#[serde(default)]
	pub payments: Vec<Payment>,
	#[serde(default)]
	pub employees: HashMap<String, Employee>,
	/// Statistics keyed by `YYYY-MM-DD`.
	#[serde(default)]
	pub statistics: HashMap<String, RawStatistics>,
}

/// Backend keeping all data in memory.
#[derive(Clone)]
pub struct MemoryBackend {
	state: Arc<RwLock<MemoryState>>,
	/// `true` while status updates are held back.
	paused: Arc<watch::Sender<bool>>,
}

impl MemoryBackend {
	pub fn new() -> Self {
		Self {
			state: Arc::new(RwLock::new(MemoryState::default())),
			paused: Arc::new(watch::Sender::new(false)),
		}
	}

	/// Creates a backend preloaded with `orders`.
	pub fn with_orders(orders: Vec<Order>) -> Self {
		let backend = Self::new();
		if let Ok(mut state) = backend.state.try_write() {
			state.orders = orders;
		}
		backend
	}

	/// Creates a backend from fixture data.
	pub fn from_fixture(fixture: MemoryFixture) -> Result<Self, BackendError> {
		let mut statistics = HashMap::new();
		for (day, stats) in fixture.statistics {
			let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d").map_err(|e| {
				BackendError::Configuration(format!("Invalid statistics date '{}': {}", day, e))
			})?;
			statistics.insert(date, stats);
		}

		let state = MemoryState {
			orders: fixture.orders,
			employees: fixture.employees,
			payments: fixture.payments,
			statistics,
			..MemoryState::default()
		};
		Ok(Self {
			state: Arc::new(RwLock::new(state)),
			paused: Arc::new(watch::Sender::new(false)),
		})
	}

	pub async fn insert_employee(&self, employee_no: impl Into<String>, employee: Employee) {
		let mut state = self.state.write().await;
		state.employees.insert(employee_no.into(), employee);
	}

	pub async fn insert_payment(&self, payment: Payment) {
		self.state.write().await.payments.push(payment);
	}

	pub async fn set_statistics(&self, date: NaiveDate, statistics: RawStatistics) {
		self.state.write().await.statistics.insert(date, statistics);
	}

	/// Makes the next update of `order_id` answer `success: false`.
	pub async fn reject_next_update(&self, order_id: &str, message: Option<String>) {
		let mut state = self.state.write().await;
		state
			.scripted
			.insert(order_id.to_string(), ScriptedFailure::Reject(message));
	}

	/// Makes the next update of `order_id` fail as if the connection dropped.
	pub async fn fail_next_update(&self, order_id: &str, reason: impl Into<String>) {
		let mut state = self.state.write().await;
		state
			.scripted
			.insert(order_id.to_string(), ScriptedFailure::Network(reason.into()));
	}

	/// Makes the next `get_order` of `order_id` fail as if the connection dropped.
	pub async fn fail_next_read(&self, order_id: &str, reason: impl Into<String>) {
		let mut state = self.state.write().await;
		state.failed_reads.insert(order_id.to_string(), reason.into());
	}

	/// Delays every `get_order` by `delay`.
	pub async fn slow_reads(&self, delay: Duration) {
		self.state.write().await.read_delay = Some(delay);
	}

	/// Holds every status update until [`resume_updates`](Self::resume_updates).
	pub fn pause_updates(&self) {
		self.paused.send_replace(true);
	}

	pub fn resume_updates(&self) {
		self.paused.send_replace(false);
	}

	/// Every update request received so far, in arrival order.
	pub async fn recorded_updates(&self) -> Vec<(String, StatusUpdateRequest)> {
		self.state.read().await.updates.clone()
	}

	/// Current copy of a stored order.
	pub async fn order(&self, order_id: &str) -> Option<Order> {
		let state = self.state.read().await;
		state.orders.iter().find(|o| o.order_id == order_id).cloned()
	}
}

impl Default for MemoryBackend {
	fn default() -> Self {
		Self::new()
	}
}

fn not_found(what: &str) -> BackendError {
	BackendError::Rejected {
		message: Some(format!("{} not found", what)),
	}
}

#[async_trait]
impl BackendInterface for MemoryBackend {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryBackendSchema)
	}

	async fn list_orders(&self) -> Result<Vec<Order>, BackendError> {
		Ok(self.state.read().await.orders.clone())
	}

	async fn get_order(&self, order_id: &str) -> Result<Order, BackendError> {
		let delay = self.state.read().await.read_delay;
		if let Some(delay) = delay {
			tokio::time::sleep(delay).await;
		}

		let failure = self.state.write().await.failed_reads.remove(order_id);
		if let Some(reason) = failure {
			return Err(BackendError::Network(reason));
		}
		self.order(order_id).await.ok_or_else(|| not_found("Order"))
	}

	async fn orders_by_employee(
		&self,
		employee_no: &str,
	) -> Result<EmployeeOrders, BackendError> {
		let state = self.state.read().await;
		let orders: Vec<Order> = state
			.orders
			.iter()
			.filter(|o| o.employee_no.as_deref() == Some(employee_no))
			.cloned()
			.collect();

		match state.employees.get(employee_no) {
			Some(employee) => Ok(EmployeeOrders {
				employee: employee.clone(),
				orders,
			}),
			None if !orders.is_empty() => Ok(EmployeeOrders {
				employee: Employee::default(),
				orders,
			}),
			None => Err(not_found("Employee")),
		}
	}

	async fn list_payments(&self) -> Result<Vec<Payment>, BackendError> {
		Ok(self.state.read().await.payments.clone())
	}

	async fn get_statistics(&self, date: NaiveDate) -> Result<RawStatistics, BackendError> {
		let state = self.state.read().await;
		Ok(state.statistics.get(&date).cloned().unwrap_or_default())
	}

	async fn update_status(
		&self,
		order_id: &str,
		request: &StatusUpdateRequest,
	) -> Result<Option<String>, BackendError> {
		self.state
			.write()
			.await
			.updates
			.push((order_id.to_string(), request.clone()));

		let mut gate = self.paused.subscribe();
		gate.wait_for(|paused| !*paused)
			.await
			.map(|_| ())
			.map_err(|e| BackendError::Network(e.to_string()))?;

		let mut state = self.state.write().await;
		match state.scripted.remove(order_id) {
			Some(ScriptedFailure::Reject(message)) => {
				return Err(BackendError::Rejected { message })
			},
			Some(ScriptedFailure::Network(reason)) => return Err(BackendError::Network(reason)),
			None => {},
		}

		let order = state
			.orders
			.iter_mut()
			.find(|o| o.order_id == order_id)
			.ok_or_else(|| not_found("Order"))?;

		let successor = OrderStatus::ALL.get(order.order_status.position() + 1);
		if successor != Some(&request.status) {
			return Err(BackendError::Rejected {
				message: Some(format!(
					"Cannot move order from {} to {}",
					order.order_status, request.status
				)),
			});
		}

		if request.status == OrderStatus::Completed {
			let Some(method) = request.payment_method else {
				return Err(BackendError::Rejected {
					message: Some("Payment method is required to complete an order".into()),
				});
			};
			order.payment_method = Some(method.to_string());
		}
		order.order_status = request.status;

		Ok(Some(format!("Order status updated to {}", request.status)))
	}
}

/// Configuration schema for MemoryBackend.
pub struct MemoryBackendSchema;

impl ConfigSchema for MemoryBackendSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(vec![], vec![Field::new("fixture", FieldType::String)]);
		schema.validate(config)
	}
}

fn load_fixture(path: &Path) -> Result<MemoryFixture, BackendError> {
	let content = std::fs::read_to_string(path).map_err(|e| {
		BackendError::Configuration(format!("Cannot read fixture {}: {}", path.display(), e))
	})?;
	serde_json::from_str(&content).map_err(|e| {
		BackendError::Configuration(format!("Invalid fixture {}: {}", path.display(), e))
	})
}

/// Factory function to create a memory backend from configuration.
pub fn create_backend(
	config: &toml::Value,
	backend: &BackendConfig,
) -> Result<Box<dyn BackendInterface>, BackendError> {
	MemoryBackendSchema
		.validate(config)
		.map_err(|e| BackendError::Configuration(format!("Invalid memory backend config: {}", e)))?;

	let memory = match config.get("fixture").and_then(|v| v.as_str()) {
		Some(path) => {
			let fixture = load_fixture(&backend.resolve_path(path))?;
			tracing::debug!(
				orders = fixture.orders.len(),
				payments = fixture.payments.len(),
				"Loaded memory fixture"
			);
			MemoryBackend::from_fixture(fixture)?
		},
		None => MemoryBackend::new(),
	};
	Ok(Box::new(memory))
}

/// Registry for the memory backend implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = BackendFactory;

	fn factory() -> Self::Factory {
		create_backend
	}
}

impl BackendRegistry for Registry {}

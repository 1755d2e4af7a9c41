//! HTTP backend implementation.
//!
//! Talks to the pharmacy REST service with `reqwest`. Every response is the
//! `{ success, message?, data? }` envelope; a `success: false` answer becomes
//! [`BackendError::Rejected`] whatever the HTTP status was.
//!
//! Configuration parameters (`[backend.implementations.http]`):
//! - `base_url` - overrides `backend.base_url` (optional)
//! - `request_timeout_seconds` - overrides `backend.request_timeout_seconds` (optional)

use crate::{BackendError, BackendFactory, BackendInterface, BackendRegistry};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use wellbeing_config::BackendConfig;
use wellbeing_types::{
	ApiResponse, ConfigSchema, EmployeeOrders, Field, FieldType, ImplementationRegistry, Order,
	Payment, RawStatistics, Schema, StatusUpdateRequest, ValidationError,
};

/// Backend reached over HTTP.
pub struct HttpBackend {
	client: Client,
	base_url: Url,
}

impl HttpBackend {
	/// Creates a client rooted at `base_url`.
	///
	/// Without a timeout a request waits for as long as the connection stays open.
	pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, BackendError> {
		let base_url = Url::parse(base_url).map_err(|e| {
			BackendError::Configuration(format!("Invalid base_url '{}': {}", base_url, e))
		})?;
		if base_url.cannot_be_a_base() {
			return Err(BackendError::Configuration(format!(
				"base_url '{}' cannot be used as a base",
				base_url
			)));
		}

		let mut builder = Client::builder()
			.pool_idle_timeout(Duration::from_secs(90))
			.pool_max_idle_per_host(10);
		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}
		let client = builder
			.build()
			.map_err(|e| BackendError::Configuration(e.to_string()))?;

		Ok(Self { client, base_url })
	}

	/// Appends path segments to the base URL, percent-encoding each one.
	fn endpoint(&self, segments: &[&str]) -> Url {
		let mut url = self.base_url.clone();
		if let Ok(mut path) = url.path_segments_mut() {
			path.pop_if_empty().extend(segments);
		}
		url
	}

	async fn send<T, B>(
		&self,
		method: Method,
		url: Url,
		query: &[(&str, &str)],
		body: Option<&B>,
	) -> Result<ApiResponse<T>, BackendError>
	where
		T: DeserializeOwned,
		B: serde::Serialize + ?Sized,
	{
		tracing::debug!(%method, %url, "Sending backend request");

		let mut request = self.client.request(method, url);
		if !query.is_empty() {
			request = request.query(query);
		}
		if let Some(body) = body {
			request = request.json(body);
		}

		let response = request
			.send()
			.await
			.map_err(|e| BackendError::Network(e.to_string()))?;
		let status = response.status();
		let bytes = response
			.bytes()
			.await
			.map_err(|e| BackendError::Network(e.to_string()))?;

		serde_json::from_slice::<ApiResponse<T>>(&bytes).map_err(|e| {
			BackendError::Decode(format!("HTTP {} with unexpected body: {}", status.as_u16(), e))
		})
	}

	/// Sends a GET and unwraps the envelope's `data`.
	async fn fetch<T: DeserializeOwned>(
		&self,
		segments: &[&str],
		query: &[(&str, &str)],
	) -> Result<T, BackendError> {
		let url = self.endpoint(segments);
		let envelope: ApiResponse<T> = self
			.send(Method::GET, url, query, None::<&()>)
			.await?;

		if !envelope.success {
			return Err(BackendError::Rejected {
				message: envelope.message,
			});
		}
		envelope
			.data
			.ok_or_else(|| BackendError::Decode("Successful response without data".into()))
	}
}

#[async_trait]
impl BackendInterface for HttpBackend {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpBackendSchema)
	}

	async fn list_orders(&self) -> Result<Vec<Order>, BackendError> {
		self.fetch(&["oder", "all"], &[]).await
	}

	async fn get_order(&self, order_id: &str) -> Result<Order, BackendError> {
		self.fetch(&["oder", "by-oder-id"], &[("order_id", order_id)])
			.await
	}

	async fn orders_by_employee(
		&self,
		employee_no: &str,
	) -> Result<EmployeeOrders, BackendError> {
		self.fetch(&["oder", "orders-by-employee"], &[("employee_no", employee_no)])
			.await
	}

	async fn list_payments(&self) -> Result<Vec<Payment>, BackendError> {
		self.fetch(&["oder", "payments-all"], &[]).await
	}

	async fn get_statistics(&self, date: NaiveDate) -> Result<RawStatistics, BackendError> {
		let date = date.format("%Y-%m-%d").to_string();
		self.fetch(&["oder", "get-statistics"], &[("date", date.as_str())])
			.await
	}

	async fn update_status(
		&self,
		order_id: &str,
		request: &StatusUpdateRequest,
	) -> Result<Option<String>, BackendError> {
		let url = self.endpoint(&["orders", order_id, "status"]);
		let envelope: ApiResponse<serde_json::Value> = self
			.send(Method::PUT, url, &[], Some(request))
			.await?;

		if envelope.success {
			Ok(envelope.message)
		} else {
			Err(BackendError::Rejected {
				message: envelope.message,
			})
		}
	}
}

/// Configuration schema for HttpBackend.
pub struct HttpBackendSchema;

impl ConfigSchema for HttpBackendSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new("base_url", FieldType::String).with_validator(|value| {
					match value.as_str().map(Url::parse) {
						Some(Ok(url)) if matches!(url.scheme(), "http" | "https") => Ok(()),
						_ => Err("must be an absolute http(s) URL".to_string()),
					}
				}),
				Field::new(
					"request_timeout_seconds",
					FieldType::Integer {
						min: Some(1),
						max: Some(600),
					},
				),
			],
		);
		schema.validate(config)
	}
}

/// Factory function to create an HTTP backend from configuration.
///
/// Values in the implementation table take precedence over the shared
/// `[backend]` section.
pub fn create_backend(
	config: &toml::Value,
	backend: &BackendConfig,
) -> Result<Box<dyn BackendInterface>, BackendError> {
	HttpBackendSchema
		.validate(config)
		.map_err(|e| BackendError::Configuration(format!("Invalid http backend config: {}", e)))?;

	let base_url = config
		.get("base_url")
		.and_then(|v| v.as_str())
		.unwrap_or_else(|| backend.base_url());
	let timeout = config
		.get("request_timeout_seconds")
		.and_then(|v| v.as_integer())
		.map(|secs| Duration::from_secs(secs as u64))
		.or_else(|| backend.request_timeout());

	Ok(Box::new(HttpBackend::new(base_url, timeout)?))
}

/// Registry for the HTTP backend implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = BackendFactory;

	fn factory() -> Self::Factory {
		create_backend
	}
}

impl BackendRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{
		extract::{Path, Query, State},
		routing::{get, put},
		Json, Router,
	};
	use serde_json::{json, Value};
	use std::collections::HashMap;
	use std::sync::{Arc, Mutex};
	use tokio::net::TcpListener;
	use wellbeing_types::{OrderStatus, PaymentMethod};

	type Recorded = Arc<Mutex<Vec<(String, Value)>>>;

	/// Starts a stand-in pharmacy backend and returns its base URL.
	async fn spawn_backend(recorded: Recorded) -> String {
		async fn all_orders() -> Json<Value> {
			Json(json!({
				"success": true,
				"data": [
					{"order_id": 1, "order_status": "placed", "employee_no": "EMP-1"},
					{"order_id": 2, "order_status": "delivered", "employee_no": "EMP-2"}
				]
			}))
		}

		async fn order_by_id(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
			match params.get("order_id").map(String::as_str) {
				Some("1") => Json(json!({
					"success": true,
					"data": {
						"order_id": 1,
						"order_status": "processing",
						"status_flow": ["placed", "processing", "completed", "delivered", "ready_to_pickup"],
						"items": [{"item_id": 10, "medicine_name": "Ibuprofen", "quantity_requested": 3, "from_inventory": true}]
					}
				})),
				_ => Json(json!({"success": false, "message": "Order not found"})),
			}
		}

		async fn statistics(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
			Json(json!({
				"success": true,
				"data": {"inventory_count": 12, "orders_per_day": [{"day": params["date"], "total_orders": "4"}]}
			}))
		}

		async fn broken() -> (axum::http::StatusCode, &'static str) {
			(axum::http::StatusCode::BAD_GATEWAY, "<html>upstream down</html>")
		}

		async fn update_status(
			State(recorded): State<Recorded>,
			Path(order_id): Path<String>,
			Json(body): Json<Value>,
		) -> Json<Value> {
			recorded.lock().unwrap().push((order_id.clone(), body));
			if order_id == "7" {
				Json(json!({"success": false, "message": "stock mismatch"}))
			} else {
				Json(json!({"success": true, "message": "Order updated"}))
			}
		}

		let app = Router::new()
			.route("/v1/wellbeing360/oder/all", get(all_orders))
			.route("/v1/wellbeing360/oder/by-oder-id", get(order_by_id))
			.route("/v1/wellbeing360/oder/get-statistics", get(statistics))
			.route("/v1/wellbeing360/oder/payments-all", get(broken))
			.route("/v1/wellbeing360/orders/{order_id}/status", put(update_status))
			.with_state(recorded);

		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		tokio::spawn(async move {
			axum::serve(listener, app).await.unwrap();
		});

		format!("http://{}/v1/wellbeing360/", addr)
	}

	async fn backend() -> (HttpBackend, Recorded) {
		let recorded: Recorded = Arc::default();
		let base_url = spawn_backend(recorded.clone()).await;
		(HttpBackend::new(&base_url, None).unwrap(), recorded)
	}

	#[tokio::test]
	async fn test_list_orders() {
		let (backend, _) = backend().await;
		let orders = backend.list_orders().await.unwrap();
		assert_eq!(orders.len(), 2);
		assert_eq!(orders[0].order_id, "1");
		assert_eq!(orders[1].order_status, OrderStatus::Delivered);
	}

	#[tokio::test]
	async fn test_get_order_and_rejection() {
		let (backend, _) = backend().await;
		let order = backend.get_order("1").await.unwrap();
		assert_eq!(order.order_status, OrderStatus::Processing);
		assert_eq!(order.status_flow.len(), 5);
		assert_eq!(order.items[0].display_name(), "Ibuprofen");

		let err = backend.get_order("404").await.unwrap_err();
		assert!(
			matches!(err, BackendError::Rejected { message: Some(ref m) } if m == "Order not found")
		);
	}

	#[tokio::test]
	async fn test_statistics_sends_date() {
		let (backend, _) = backend().await;
		let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
		let stats = backend.get_statistics(date).await.unwrap();
		assert_eq!(stats.inventory_count, Some(12));
		let days = stats.orders_per_day.unwrap();
		assert_eq!(days[0].day, "2025-06-01");
		assert_eq!(days[0].total_orders, Some(4));
	}

	#[tokio::test]
	async fn test_non_envelope_body_is_decode_error() {
		let (backend, _) = backend().await;
		let err = backend.list_payments().await.unwrap_err();
		assert!(matches!(err, BackendError::Decode(ref m) if m.contains("HTTP 502")));
	}

	#[tokio::test]
	async fn test_update_status_wire_shape() {
		let (backend, recorded) = backend().await;

		let ack = backend
			.update_status(
				"3",
				&StatusUpdateRequest {
					status: OrderStatus::Completed,
					payment_method: Some(PaymentMethod::Online),
				},
			)
			.await
			.unwrap();
		assert_eq!(ack.as_deref(), Some("Order updated"));

		backend
			.update_status(
				"4",
				&StatusUpdateRequest {
					status: OrderStatus::Processing,
					payment_method: None,
				},
			)
			.await
			.unwrap();

		let recorded = recorded.lock().unwrap().clone();
		assert_eq!(recorded[0].0, "3");
		assert_eq!(recorded[0].1, json!({"status": "completed", "payment_method": "online"}));
		assert_eq!(recorded[1].0, "4");
		assert_eq!(recorded[1].1, json!({"status": "processing"}));
	}

	#[tokio::test]
	async fn test_update_status_rejected_with_message() {
		let (backend, _) = backend().await;
		let err = backend
			.update_status(
				"7",
				&StatusUpdateRequest {
					status: OrderStatus::ReadyToPickup,
					payment_method: None,
				},
			)
			.await
			.unwrap_err();
		assert!(
			matches!(err, BackendError::Rejected { message: Some(ref m) } if m == "stock mismatch")
		);
	}

	#[tokio::test]
	async fn test_unreachable_backend_is_network_error() {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		drop(listener);

		let backend = HttpBackend::new(&format!("http://{}/v1", addr), None).unwrap();
		let err = backend.list_orders().await.unwrap_err();
		assert!(matches!(err, BackendError::Network(_)));
	}

	#[test]
	fn test_endpoint_encodes_segments() {
		let backend = HttpBackend::new("http://localhost:8599/v1/wellbeing360", None).unwrap();
		let url = backend.endpoint(&["orders", "A 1/2", "status"]);
		assert_eq!(
			url.as_str(),
			"http://localhost:8599/v1/wellbeing360/orders/A%201%2F2/status"
		);
	}

	#[test]
	fn test_factory_prefers_implementation_table() {
		let backend_config = BackendConfig {
			primary: "http".to_string(),
			base_url: "http://localhost:8599/v1/wellbeing360".to_string(),
			request_timeout_seconds: None,
			config_dir: None,
			implementations: HashMap::new(),
		};
		let table: toml::Value = toml::from_str("base_url = \"ftp://nowhere\"").unwrap();
		let err = create_backend(&table, &backend_config).err().unwrap();
		assert!(matches!(err, BackendError::Configuration(_)));

		let table: toml::Value = toml::from_str("request_timeout_seconds = 5").unwrap();
		assert!(create_backend(&table, &backend_config).is_ok());
	}
}

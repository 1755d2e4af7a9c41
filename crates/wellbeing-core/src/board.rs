//! State container behind the pharmacy orders screen.
//!
//! The board holds the fetched order list, the search term and the selected
//! order. Rendering is a projection of that state; a held order only changes
//! status after the backend confirmed an advance.

use crate::event_bus::EventBus;
use crate::BoardError;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tracing::instrument;
use wellbeing_client::BackendService;
use wellbeing_config::WorkflowConfig;
use wellbeing_types::{truncate_id, Order, OrderStatus, WorkflowEvent};
use wellbeing_workflow::{
	action_label, next_status, stepper, OrderWorkflow, StatusAdvance, Step, WorkflowError,
};

#[derive(Debug, Default)]
struct BoardState {
	orders: Vec<Order>,
	search: String,
	selected: Option<Order>,
}

/// What the order details view shows for the selected order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderView {
	pub order: Order,
	pub steps: Vec<Step>,
	pub action_label: &'static str,
	/// False for terminal orders and while an advance is outstanding.
	pub can_advance: bool,
	pub in_flight: bool,
}

/// Marks an order as having an advance outstanding until dropped.
struct InFlightGuard<'a> {
	in_flight: &'a Mutex<HashSet<String>>,
	order_id: String,
}

impl<'a> InFlightGuard<'a> {
	fn acquire(in_flight: &'a Mutex<HashSet<String>>, order_id: &str) -> Option<Self> {
		let mut set = in_flight.lock().unwrap_or_else(|e| e.into_inner());
		if !set.insert(order_id.to_string()) {
			return None;
		}
		Some(Self {
			in_flight,
			order_id: order_id.to_string(),
		})
	}
}

impl Drop for InFlightGuard<'_> {
	fn drop(&mut self) {
		let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
		set.remove(&self.order_id);
	}
}

/// Controller for the orders screen.
pub struct OrderBoard {
	backend: Arc<BackendService>,
	workflow: OrderWorkflow,
	event_bus: EventBus,
	single_flight: bool,
	in_flight: Mutex<HashSet<String>>,
	state: RwLock<BoardState>,
}

impl OrderBoard {
	pub fn new(backend: Arc<BackendService>, config: &WorkflowConfig, event_bus: EventBus) -> Self {
		Self {
			workflow: OrderWorkflow::new(backend.clone()),
			backend,
			event_bus,
			single_flight: config.single_flight,
			in_flight: Mutex::new(HashSet::new()),
			state: RwLock::new(BoardState::default()),
		}
	}

	/// Replaces the held order list with the backend's.
	///
	/// On failure the previous list is kept.
	pub async fn refresh(&self) -> Result<usize, BoardError> {
		let orders = self
			.backend
			.list_orders()
			.await
			.map_err(|e| BoardError::Backend(e.to_string()))?;

		let mut state = self.state.write().await;
		state.orders = orders;
		Ok(state.orders.len())
	}

	pub async fn orders(&self) -> Vec<Order> {
		self.state.read().await.orders.clone()
	}

	/// Sets the employee number filter.
	pub async fn search(&self, term: &str) {
		self.state.write().await.search = term.to_string();
	}

	/// Held orders whose employee number contains the search term.
	pub async fn filtered(&self) -> Vec<Order> {
		let state = self.state.read().await;
		state
			.orders
			.iter()
			.filter(|order| order.matches_employee(&state.search))
			.cloned()
			.collect()
	}

	/// Fetches an order with its items and makes it the selected order.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn select(&self, order_id: &str) -> Result<Order, BoardError> {
		let order = self
			.backend
			.get_order(order_id)
			.await
			.map_err(|e| BoardError::Backend(e.to_string()))?;

		self.state.write().await.selected = Some(order.clone());
		Ok(order)
	}

	pub async fn selected(&self) -> Option<Order> {
		self.state.read().await.selected.clone()
	}

	pub async fn clear_selection(&self) {
		self.state.write().await.selected = None;
	}

	/// Details view of the selected order.
	pub async fn selected_view(&self) -> Option<OrderView> {
		let order = self.selected().await?;
		let in_flight = self.is_in_flight(&order.order_id);
		let terminal = next_status(order.order_status).is_terminal();

		Some(OrderView {
			steps: stepper(&order),
			action_label: action_label(order.order_status),
			can_advance: !terminal && !in_flight,
			in_flight,
			order,
		})
	}

	pub fn is_in_flight(&self, order_id: &str) -> bool {
		self.in_flight
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.contains(order_id)
	}

	/// Advances the selected order.
	pub async fn advance_selected(&self) -> Result<StatusAdvance, BoardError> {
		let order_id = self
			.selected()
			.await
			.map(|order| order.order_id)
			.ok_or(BoardError::NothingSelected)?;
		self.advance(&order_id).await
	}

	/// Moves an order one step forward and re-fetches it on success.
	///
	/// The held copy is never changed before the backend confirms, and the
	/// in-flight mark is taken before the current status is read. Every
	/// outcome is published on the event bus.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn advance(&self, order_id: &str) -> Result<StatusAdvance, BoardError> {
		let _guard = if self.single_flight {
			match InFlightGuard::acquire(&self.in_flight, order_id) {
				Some(guard) => Some(guard),
				None => {
					let err = WorkflowError::AdvanceInFlight {
						order_id: order_id.to_string(),
					};
					self.publish_failure(self.held_status(order_id).await, &err);
					return Err(err.into());
				},
			}
		} else {
			None
		};

		let current = self.current_status(order_id).await?;
		match self.workflow.advance(order_id, current).await {
			Ok(advance) => {
				self.event_bus
					.publish(WorkflowEvent::StatusAdvanced {
						order_id: advance.order_id.clone(),
						from: advance.from,
						to: advance.to,
					})
					.ok();
				self.reload(&advance).await;
				Ok(advance)
			},
			Err(err) => {
				self.publish_failure(Some(current), &err);
				Err(err.into())
			},
		}
	}

	async fn held_status(&self, order_id: &str) -> Option<OrderStatus> {
		let state = self.state.read().await;
		state
			.selected
			.iter()
			.chain(state.orders.iter())
			.find(|order| order.order_id == order_id)
			.map(|order| order.order_status)
	}

	/// Status of the held copy, fetching the order when it is not held.
	async fn current_status(&self, order_id: &str) -> Result<OrderStatus, BoardError> {
		if let Some(status) = self.held_status(order_id).await {
			return Ok(status);
		}

		let order = self
			.backend
			.get_order(order_id)
			.await
			.map_err(|e| BoardError::UnknownOrder(format!("{}: {}", order_id, e)))?;
		Ok(order.order_status)
	}

	/// Replaces the held copies of an advanced order with the backend's.
	///
	/// When the re-fetch fails the held copies take the confirmed status.
	async fn reload(&self, advance: &StatusAdvance) {
		let fetched = match self.backend.get_order(&advance.order_id).await {
			Ok(order) => Some(order),
			Err(e) => {
				tracing::warn!(
					error = %e,
					status = %advance.to,
					"Failed to re-fetch order after advance, keeping confirmed status"
				);
				None
			},
		};

		let mut state = self.state.write().await;
		let BoardState {
			orders, selected, ..
		} = &mut *state;
		let held = orders
			.iter_mut()
			.chain(selected.iter_mut())
			.filter(|order| order.order_id == advance.order_id);
		for order in held {
			match &fetched {
				Some(fresh) => *order = fresh.clone(),
				None => order.order_status = advance.to,
			}
		}
	}

	fn publish_failure(&self, from: Option<OrderStatus>, err: &WorkflowError) {
		self.event_bus
			.publish(WorkflowEvent::AdvanceFailed {
				order_id: err.order_id().to_string(),
				from,
				to: err.attempted(),
				reason: err.user_message(),
			})
			.ok();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;
	use wellbeing_client::implementations::memory::MemoryBackend;

	fn order(id: &str, employee_no: &str, status: OrderStatus) -> Order {
		Order {
			order_status: status,
			employee_no: Some(employee_no.to_string()),
			..Order::placed(id)
		}
	}

	fn board_with(orders: Vec<Order>, single_flight: bool) -> (Arc<OrderBoard>, MemoryBackend, EventBus) {
		let backend = MemoryBackend::with_orders(orders);
		let service = Arc::new(BackendService::new(Box::new(backend.clone())));
		let bus = EventBus::default();
		let board = OrderBoard::new(service, &WorkflowConfig { single_flight }, bus.clone());
		(Arc::new(board), backend, bus)
	}

	#[tokio::test]
	async fn test_refresh_and_search() {
		let (board, _, _) = board_with(
			vec![
				order("1", "EMP-100", OrderStatus::Placed),
				order("2", "emp-200", OrderStatus::Processing),
				Order::placed("3"),
			],
			true,
		);

		assert_eq!(board.refresh().await.unwrap(), 3);
		assert_eq!(board.filtered().await.len(), 3);

		board.search("EMP-2").await;
		let filtered = board.filtered().await;
		assert_eq!(filtered.len(), 1);
		assert_eq!(filtered[0].order_id, "2");

		board.search("").await;
		assert_eq!(board.filtered().await.len(), 3);
	}

	#[tokio::test]
	async fn test_advance_refetches_and_publishes() {
		let (board, _, bus) = board_with(vec![order("1", "EMP-1", OrderStatus::Placed)], true);
		let mut events = bus.subscribe();
		board.refresh().await.unwrap();
		board.select("1").await.unwrap();

		let advance = board.advance_selected().await.unwrap();
		assert_eq!(advance.to, OrderStatus::Processing);

		let view = board.selected_view().await.unwrap();
		assert_eq!(view.order.order_status, OrderStatus::Processing);
		assert_eq!(view.action_label, "Update Order to Completed");
		assert!(view.can_advance);
		assert_eq!(board.orders().await[0].order_status, OrderStatus::Processing);

		let event = events.recv().await.unwrap();
		assert!(event.is_success());
		assert_eq!(event.order_id(), "1");
	}

	#[tokio::test]
	async fn test_rejected_advance_leaves_state_unchanged() {
		let (board, backend, bus) =
			board_with(vec![order("7", "EMP-1", OrderStatus::Delivered)], true);
		let mut events = bus.subscribe();
		board.refresh().await.unwrap();
		board.select("7").await.unwrap();
		backend
			.reject_next_update("7", Some("stock mismatch".to_string()))
			.await;

		let err = board.advance("7").await.unwrap_err();
		assert!(matches!(
			err,
			BoardError::Workflow(WorkflowError::ServiceRejected { .. })
		));

		assert_eq!(
			board.selected().await.unwrap().order_status,
			OrderStatus::Delivered
		);
		match events.recv().await.unwrap() {
			WorkflowEvent::AdvanceFailed { reason, to, .. } => {
				assert_eq!(reason, "stock mismatch");
				assert_eq!(to, Some(OrderStatus::ReadyToPickup));
			},
			other => panic!("unexpected event {other:?}"),
		}
	}

	#[tokio::test]
	async fn test_terminal_order_view_is_disabled() {
		let (board, backend, _) =
			board_with(vec![order("9", "EMP-1", OrderStatus::ReadyToPickup)], true);
		board.select("9").await.unwrap();

		let view = board.selected_view().await.unwrap();
		assert!(!view.can_advance);
		assert_eq!(view.action_label, "No Further Updates");
		assert!(view.steps.iter().all(|step| step.reached));

		let err = board.advance_selected().await.unwrap_err();
		assert!(matches!(
			err,
			BoardError::Workflow(WorkflowError::TerminalState { .. })
		));
		assert!(backend.recorded_updates().await.is_empty());
	}

	#[tokio::test]
	async fn test_second_advance_while_outstanding_is_refused() {
		let (board, backend, _) = board_with(vec![order("4", "EMP-1", OrderStatus::Placed)], true);
		board.refresh().await.unwrap();
		backend.pause_updates();

		let first = {
			let board = board.clone();
			tokio::spawn(async move { board.advance("4").await })
		};
		while backend.recorded_updates().await.is_empty() {
			tokio::time::sleep(Duration::from_millis(5)).await;
		}
		assert!(board.is_in_flight("4"));

		let err = board.advance("4").await.unwrap_err();
		assert!(matches!(
			err,
			BoardError::Workflow(WorkflowError::AdvanceInFlight { .. })
		));

		backend.resume_updates();
		first.await.unwrap().unwrap();
		assert!(!board.is_in_flight("4"));
		assert_eq!(backend.recorded_updates().await.len(), 1);
		assert_eq!(board.orders().await[0].order_status, OrderStatus::Processing);
	}

	#[tokio::test]
	async fn test_guard_covers_slow_status_lookup() {
		let (board, backend, _) = board_with(vec![order("1", "EMP-1", OrderStatus::Placed)], true);
		backend.slow_reads(Duration::from_millis(100)).await;

		let first = {
			let board = board.clone();
			tokio::spawn(async move { board.advance("1").await })
		};
		while !board.is_in_flight("1") {
			tokio::time::sleep(Duration::from_millis(1)).await;
		}
		assert!(backend.recorded_updates().await.is_empty());

		let err = board.advance("1").await.unwrap_err();
		assert!(matches!(
			err,
			BoardError::Workflow(WorkflowError::AdvanceInFlight { .. })
		));

		let advance = first.await.unwrap().unwrap();
		assert_eq!(advance.to, OrderStatus::Processing);
		assert_eq!(backend.recorded_updates().await.len(), 1);
	}

	#[tokio::test]
	async fn test_in_flight_refusal_reports_unknown_status_when_not_held() {
		let (board, backend, bus) = board_with(vec![order("2", "EMP-1", OrderStatus::Placed)], true);
		let mut events = bus.subscribe();
		backend.pause_updates();

		let first = {
			let board = board.clone();
			tokio::spawn(async move { board.advance("2").await })
		};
		while backend.recorded_updates().await.is_empty() {
			tokio::time::sleep(Duration::from_millis(5)).await;
		}

		board.advance("2").await.unwrap_err();
		match events.recv().await.unwrap() {
			WorkflowEvent::AdvanceFailed { from, to, .. } => {
				assert_eq!(from, None);
				assert_eq!(to, None);
			},
			other => panic!("unexpected event {other:?}"),
		}

		backend.resume_updates();
		first.await.unwrap().unwrap();
	}

	#[tokio::test]
	async fn test_failed_refetch_keeps_confirmed_status() {
		let (board, backend, _) = board_with(vec![order("5", "EMP-1", OrderStatus::Placed)], true);
		board.refresh().await.unwrap();
		board.select("5").await.unwrap();
		backend.fail_next_read("5", "connection reset").await;

		let advance = board.advance_selected().await.unwrap();
		assert_eq!(advance.to, OrderStatus::Processing);

		let view = board.selected_view().await.unwrap();
		assert_eq!(view.order.order_status, OrderStatus::Processing);
		assert_eq!(view.action_label, "Update Order to Completed");
		assert_eq!(board.orders().await[0].order_status, OrderStatus::Processing);

		board.advance_selected().await.unwrap();
		let sent: Vec<OrderStatus> = backend
			.recorded_updates()
			.await
			.into_iter()
			.map(|(_, request)| request.status)
			.collect();
		assert_eq!(sent, vec![OrderStatus::Processing, OrderStatus::Completed]);
	}

	#[tokio::test]
	async fn test_advance_without_selection() {
		let (board, _, _) = board_with(vec![], true);
		assert!(matches!(
			board.advance_selected().await,
			Err(BoardError::NothingSelected)
		));
		assert!(matches!(
			board.advance("404").await,
			Err(BoardError::UnknownOrder(_))
		));
	}
}

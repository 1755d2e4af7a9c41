//! Subcommand handlers.
//!
//! Each handler returns the text to print so the binary stays a thin shell
//! around the screen controllers.

use crate::render;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use wellbeing_client::BackendService;
use wellbeing_config::Config;
use wellbeing_core::{
	export_employee_orders, BoardError, EventBus, OrderBoard, PaymentsView, StatisticsSummary,
	StatusTab,
};
use wellbeing_types::WorkflowEvent;

type CommandResult = Result<String, Box<dyn std::error::Error>>;

/// An advance that did not go through, with the notifications it produced.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct AdvanceFailed {
	pub output: String,
	pub source: BoardError,
}

/// Wired-up controllers for one invocation.
pub struct App {
	backend: Arc<BackendService>,
	board: OrderBoard,
	notifications: broadcast::Receiver<WorkflowEvent>,
	export_dir: PathBuf,
}

impl App {
	pub fn from_config(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
		let backend = Arc::new(BackendService::from_config(&config.backend)?);
		Ok(Self::new(backend, config))
	}

	pub fn new(backend: Arc<BackendService>, config: &Config) -> Self {
		let event_bus = EventBus::default();
		let notifications = event_bus.subscribe();
		Self {
			board: OrderBoard::new(backend.clone(), &config.workflow, event_bus),
			backend,
			notifications,
			export_dir: config.export.directory.clone(),
		}
	}

	pub async fn orders(&self, employee: Option<&str>) -> CommandResult {
		self.board.refresh().await?;
		self.board.search(employee.unwrap_or_default()).await;
		Ok(render::order_table(&self.board.filtered().await))
	}

	pub async fn show(&self, order_id: &str) -> CommandResult {
		self.board.select(order_id).await?;
		let view = self
			.board
			.selected_view()
			.await
			.ok_or(BoardError::NothingSelected)?;
		Ok(render::order_details(&view))
	}

	/// Advances an order and reports the outcome as notifications.
	///
	/// On failure the notifications are carried in the error.
	pub async fn advance(&mut self, order_id: &str) -> Result<String, AdvanceFailed> {
		if let Err(source) = self.board.select(order_id).await {
			return Err(AdvanceFailed {
				output: String::new(),
				source,
			});
		}
		let outcome = self.board.advance_selected().await;

		let mut output = self.drain_notifications();
		match outcome {
			Ok(_) => {
				if let Some(view) = self.board.selected_view().await {
					output.push('\n');
					output.push_str(&render::order_details(&view));
				}
				Ok(output)
			},
			Err(source) => {
				tracing::debug!(error = %source, "Advance failed");
				Err(AdvanceFailed { output, source })
			},
		}
	}

	pub async fn employee(&self, employee_no: &str, export: bool) -> CommandResult {
		let found = self.backend.orders_by_employee(employee_no).await?;
		let mut out = render::employee_orders(&found);

		if export {
			let path = export_employee_orders(&found.orders, employee_no, &self.export_dir)?;
			out.push_str(&format!("\nExported to {}\n", path.display()));
		}
		Ok(out)
	}

	pub async fn payments(&self, employee: Option<&str>, status: StatusTab) -> CommandResult {
		let view = PaymentsView::load(&self.backend).await?;
		let filtered = view.filter(employee.unwrap_or_default(), status);
		Ok(render::payment_table(&filtered))
	}

	pub async fn stats(&self, date: NaiveDate) -> CommandResult {
		let raw = self.backend.get_statistics(date).await?;
		let summary = StatisticsSummary::summarize(&raw);
		Ok(format!("Statistics for {}\n\n{}", date, render::statistics(&summary)))
	}

	fn drain_notifications(&mut self) -> String {
		let mut out = String::new();
		loop {
			match self.notifications.try_recv() {
				Ok(event) => {
					out.push_str(&render::toast(&event));
					out.push('\n');
				},
				Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
					tracing::warn!(skipped, "Notifications dropped");
				},
				Err(_) => break,
			}
		}
		out
	}
}

//! Broadcast channel carrying workflow notifications.
//!
//! Publishing never blocks; a subscriber that falls more than the channel
//! capacity behind loses the oldest events.

use tokio::sync::broadcast;
use wellbeing_types::WorkflowEvent;

/// Default number of events buffered per subscriber.
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<WorkflowEvent>,
}

impl EventBus {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
		self.sender.subscribe()
	}

	/// Sends an event to every current subscriber.
	///
	/// Fails only when nobody is subscribed.
	pub fn publish(
		&self,
		event: WorkflowEvent,
	) -> Result<usize, broadcast::error::SendError<WorkflowEvent>> {
		self.sender.send(event)
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use wellbeing_types::OrderStatus;

	#[tokio::test]
	async fn test_publish_reaches_all_subscribers() {
		let bus = EventBus::default();
		let mut first = bus.subscribe();
		let mut second = bus.subscribe();

		let event = WorkflowEvent::StatusAdvanced {
			order_id: "1".to_string(),
			from: OrderStatus::Placed,
			to: OrderStatus::Processing,
		};
		assert_eq!(bus.publish(event.clone()).unwrap(), 2);

		assert_eq!(first.recv().await.unwrap(), event);
		assert_eq!(second.recv().await.unwrap(), event);
	}

	#[test]
	fn test_publish_without_subscribers_is_an_error() {
		let bus = EventBus::new(4);
		let event = WorkflowEvent::AdvanceFailed {
			order_id: "1".to_string(),
			from: Some(OrderStatus::Delivered),
			to: None,
			reason: "offline".to_string(),
		};
		assert!(bus.publish(event).is_err());
	}
}

//! Mock fallback decoration around the typed facade.
//!
//! Two independent switches govern canned responses: proactive mock mode skips the live
//! call entirely, and fallback-on-error substitutes a caller-supplied payload after a
//! live call ultimately fails with an availability-class error. Neither switch ever
//! masks a failure when no payload was supplied, and credential/input errors always
//! propagate regardless of configuration.

// crates.io
use tokio::time::sleep;
// self
use crate::{_prelude::*, config::ClientConfig};

/// Fixed latency simulated before a mock payload is returned, so mocked flows exercise
/// the same asynchrony as live ones.
pub const MOCK_LATENCY: Duration = Duration::from_millis(500);

/// Decision layer for caller-supplied mock payloads.
#[derive(Clone, Copy, Debug)]
pub struct MockFallback {
	proactive: bool,
	on_error: bool,
}
impl MockFallback {
	/// Derives the layer from a client configuration.
	pub fn from_config(config: &ClientConfig) -> Self {
		Self { proactive: config.use_mock_data, on_error: config.fallback_on_error }
	}

	/// True when a supplied payload should preempt the live call entirely.
	pub fn preempts<T>(&self, mock: &Option<T>) -> bool {
		self.proactive && mock.is_some()
	}

	/// True when a supplied payload may substitute for the given failure.
	pub fn recovers(&self, error: &Error) -> bool {
		self.on_error && error.is_mock_recoverable()
	}

	/// Serves a payload after the simulated latency. Stateless: identical inputs yield
	/// identical outputs on every call.
	pub async fn serve<T>(&self, payload: T) -> T {
		sleep(MOCK_LATENCY).await;

		payload
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use tokio::time::Instant;
	// self
	use super::*;
	use crate::error::{TransientError, TransportError};

	fn layer(proactive: bool, on_error: bool) -> MockFallback {
		MockFallback { proactive, on_error }
	}

	#[test]
	fn preemption_requires_both_mode_and_payload() {
		assert!(layer(true, true).preempts(&Some(1)));
		assert!(!layer(true, true).preempts(&None::<u32>));
		assert!(!layer(false, true).preempts(&Some(1)));
	}

	#[test]
	fn recovery_respects_the_switch_and_the_error_class() {
		let transient: Error = TransientError::Unavailable { status: 503, attempts: 4 }.into();
		let timeout: Error = TransportError::Timeout.into();

		assert!(layer(false, true).recovers(&transient));
		assert!(layer(false, true).recovers(&timeout));
		assert!(!layer(false, false).recovers(&transient));
		assert!(!layer(true, true).recovers(&Error::Unauthorized));
		assert!(!layer(true, true).recovers(&Error::Client {
			status: 400,
			friendly_message: "CIF invalid".into(),
		}));
	}

	#[tokio::test(start_paused = true)]
	async fn serving_waits_the_simulated_latency_and_is_idempotent() {
		let layer = layer(true, true);
		let start = Instant::now();
		let first = layer.serve(vec![1, 2, 3]).await;

		assert_eq!(start.elapsed(), MOCK_LATENCY);

		let second = layer.serve(vec![1, 2, 3]).await;

		assert_eq!(first, second);
	}
}

//! Process-wide request pacing for the SPV API.
//!
//! ANAF enforces a hard quota on SPV calls, so every outbound request funnels through one
//! [`RateLimiter`]: a single shared bottleneck, not a per-caller budget. The upstream
//! implementation spread this over three module-level variables (a pending array, a
//! `lastRequestTime` stamp, and a `processingQueue` re-entrancy flag); here the state is
//! one scheduler object. A fair async mutex over the dispatch clock doubles as the FIFO
//! queue and the re-entrancy guard: the holder sleeping out the remaining interval IS the
//! drain step, waiters are released in arrival order, and an idle limiter holds no timers.

// crates.io
use tokio::{
	sync::Mutex as FairMutex,
	time::{Instant, sleep},
};
// self
use crate::_prelude::*;

/// Serializes bursts of requests so at most one dispatch happens per interval.
///
/// The interval is measured from the timestamp of the previously *dispatched* request,
/// never from enqueue time, so a burst of N callers drains in exactly N-1 intervals.
#[derive(Debug)]
pub struct RateLimiter {
	interval: Duration,
	// Single-writer dispatch clock; `tokio::sync::Mutex` queues waiters FIFO.
	clock: FairMutex<Option<Instant>>,
}
impl RateLimiter {
	/// Creates a limiter enforcing the provided minimum inter-dispatch interval.
	pub fn new(interval: Duration) -> Self {
		Self { interval, clock: FairMutex::new(None) }
	}

	/// Returns the configured minimum inter-dispatch interval.
	pub fn interval(&self) -> Duration {
		self.interval
	}

	/// Suspends the caller until its dispatch slot arrives, then stamps the clock.
	///
	/// Cannot fail; failures belong to whatever the caller dispatches afterwards.
	pub async fn pace(&self) {
		let mut last = self.clock.lock().await;

		if let Some(previous) = *last {
			let elapsed = previous.elapsed();

			if elapsed < self.interval {
				sleep(self.interval - elapsed).await;
			}
		}

		*last = Some(Instant::now());
	}

	/// Runs `operation` in the caller's dispatch slot, forwarding its output unchanged.
	pub async fn run<F>(&self, operation: F) -> F::Output
	where
		F: Future,
	{
		self.pace().await;

		operation.await
	}
}

//! Status-driven retry classification and backoff arithmetic.
//!
//! The policy is deliberately pure: it looks at nothing but the HTTP outcome of one
//! attempt and the attempt counter, so the facade's retry loop stays an explicit,
//! bounded iteration instead of the recursive self-call the upstream interceptor used.

// self
use crate::{
	_prelude::*,
	config::{ClientConfig, DEFAULT_RETRY_AFTER},
};

/// Per-client retry tunables, derived from [`ClientConfig`].
#[derive(Clone, Debug)]
pub struct RetryPolicy {
	/// Retry cap for transient failures (HTTP 503 and transport errors).
	pub max_retries: u32,
	/// Exponential backoff base delay.
	pub retry_delay: Duration,
	/// Total wall-clock budget spent honoring 429 `Retry-After` advice. Throttling
	/// advice from the server is authoritative per wait, but an endpoint that never
	/// stops throttling must not pin a request forever.
	pub throttle_budget: Duration,
	/// Wait applied when a 429 response carries no `Retry-After` header.
	pub default_retry_after: Duration,
}
impl RetryPolicy {
	/// Derives the policy from a client configuration.
	pub fn from_config(config: &ClientConfig) -> Self {
		Self {
			max_retries: config.max_retries,
			retry_delay: config.retry_delay,
			throttle_budget: config.throttle_budget,
			default_retry_after: DEFAULT_RETRY_AFTER,
		}
	}

	/// Backoff before the `retry`-th retry (1-based): `retry_delay * 2^(retry-1)`.
	pub fn backoff_delay(&self, retry: u32) -> Duration {
		self.retry_delay.saturating_mul(2u32.saturating_pow(retry.saturating_sub(1)))
	}
}

/// How the retry loop treats one non-2xx HTTP status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RetryClass {
	/// 401: clear credentials, fire the unauthorized handler, never retry.
	Unauthorized,
	/// 429: wait out the server's `Retry-After` advice and retry within the budget.
	Throttled,
	/// 503: retry with exponential backoff up to the cap.
	Transient,
	/// 400: surface immediately with a human-readable message, never retry.
	Client,
	/// Anything else: log diagnostics and surface unchanged, never retry.
	Unexpected,
}
impl RetryClass {
	/// Classifies a non-2xx status code.
	pub const fn of(status: u16) -> Self {
		match status {
			401 => RetryClass::Unauthorized,
			429 => RetryClass::Throttled,
			503 => RetryClass::Transient,
			400 => RetryClass::Client,
			_ => RetryClass::Unexpected,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RetryClass::Unauthorized => "unauthorized",
			RetryClass::Throttled => "throttled",
			RetryClass::Transient => "transient",
			RetryClass::Client => "client",
			RetryClass::Unexpected => "unexpected",
		}
	}
}
impl Display for RetryClass {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

//! Optional observability helpers for facade requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `spv_client.request` with the
//!   `method` and `path` fields, plus warnings for mock fallback and diagnostics for
//!   unclassified responses.
//! - Enable `metrics` to increment the `spv_client_request_total` counter for every
//!   attempt/success/failure (labeled by `method` + `outcome`) and the
//!   `spv_client_retry_total` counter for every internal retry (labeled by `reason`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each logical request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Entry to a facade verb.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::Failure => "failure",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Reason labels recorded for each internal retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RetryReason {
	/// Server answered 429 and the loop honored its `Retry-After` advice.
	Throttled,
	/// Server answered 503 or the transport failed; exponential backoff applied.
	Transient,
}
impl RetryReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RetryReason::Throttled => "throttled",
			RetryReason::Transient => "transient",
		}
	}
}
impl Display for RetryReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

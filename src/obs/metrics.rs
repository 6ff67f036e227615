// self
use crate::{
	http::Method,
	obs::{RequestOutcome, RetryReason},
};

/// Records a request outcome via the global metrics recorder (when enabled).
pub fn record_request_outcome(method: Method, outcome: RequestOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"spv_client_request_total",
			"method" => method.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (method, outcome);
	}
}

/// Records one internal retry via the global metrics recorder (when enabled).
pub fn record_retry(reason: RetryReason) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("spv_client_retry_total", "reason" => reason.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = reason;
	}
}

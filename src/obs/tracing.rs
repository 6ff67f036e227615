// self
use crate::{_prelude::*, http::Method};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedRequest<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRequest<F> = F;

/// A span builder covering one logical request, retries included.
#[derive(Clone, Debug)]
pub struct RequestSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RequestSpan {
	/// Creates a new span tagged with the request's verb and path.
	pub fn new(method: Method, path: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("spv_client.request", method = method.as_str(), path);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (method, path);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRequest<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Warns that a live call failed and a caller-supplied mock payload was served instead.
pub fn warn_mock_fallback(path: &str) {
	#[cfg(feature = "tracing")]
	tracing::warn!(path, "Live SPV call failed; serving the supplied mock payload instead.");
	#[cfg(not(feature = "tracing"))]
	let _ = path;
}

/// Logs the diagnostic context of a response the classifier could not place.
pub fn log_unexpected_response(method: Method, url: &Url, status: Option<u16>, message: &str) {
	#[cfg(feature = "tracing")]
	tracing::error!(
		method = method.as_str(),
		url = %url,
		status,
		message,
		"SPV returned an unclassified response.",
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (method, url, status, message);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = RequestSpan::new(Method::Get, "/efactura/status");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[test]
	fn diagnostics_are_noop_without_tracing() {
		let url = Url::parse("https://spv.example.com/efactura/upload")
			.expect("Fixture URL should parse.");

		warn_mock_fallback("/efactura/upload");
		log_unexpected_response(Method::Post, &url, Some(502), "bad gateway");
	}
}

//! Transport primitives for SPV calls.
//!
//! The module exposes [`SpvTransport`] alongside [`ApiRequest`] and [`ApiResponse`] so
//! downstream crates can integrate custom HTTP clients without losing the facade's retry
//! classification. Implementations execute exactly one HTTP attempt per call—no retrying,
//! no header mutation beyond what the request describes—and surface `Retry-After` advice
//! on the response so the retry loop can honor server-side throttling.

// crates.io
#[cfg(feature = "reqwest")]
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, RETRY_AFTER};
use time::{OffsetDateTime, format_description::well_known::Rfc2822};
// self
use crate::{_prelude::*, auth::TokenSecret, error::TransportError};

/// HTTP verbs the facade issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// HTTP GET.
	Get,
	/// HTTP POST.
	Post,
	/// HTTP PUT.
	Put,
	/// HTTP DELETE.
	Delete,
}
impl Method {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One fully-described HTTP attempt.
///
/// The bearer secret is attached per attempt (not per logical request) so a token
/// replaced mid-retry is picked up by the next attempt.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP verb.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// `Content-Type` header value, set only when a body is present.
	pub content_type: Option<&'static str>,
	/// Request body bytes.
	pub body: Option<Vec<u8>>,
	/// Bearer secret injected as an `Authorization` header, when present.
	pub bearer: Option<TokenSecret>,
}

/// Outcome of one HTTP attempt that reached the server.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// `Retry-After` advice parsed from the response headers.
	pub retry_after: Option<Duration>,
	/// `Content-Type` header value, when present.
	pub content_type: Option<String>,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// True for 2xx statuses.
	pub const fn is_success(&self) -> bool {
		self.status >= 200 && self.status < 300
	}
}

/// Boxed future returned by [`SpvTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing one SPV attempt.
///
/// The trait is the facade's only dependency on an HTTP client. Implementations must be
/// `Send + Sync + 'static` so one transport can be shared across clients, and the futures
/// they return must be `Send` so facade calls can hop executors freely. Transports map
/// their native failures onto [`TransportError`]; timeouts must become
/// [`TransportError::Timeout`] so the retry loop treats them as transient.
pub trait SpvTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes a single HTTP attempt.
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_>;
}

/// Parses a raw `Retry-After` header value: either delta-seconds or an RFC 2822 date.
///
/// Exposed for custom [`SpvTransport`] implementations so all transports report the
/// same advice shape to the retry loop.
pub fn parse_retry_after_value(raw: &str) -> Option<Duration> {
	let raw = raw.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::from_secs(secs));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Duration::try_from(delta).ok();
		}
	}

	None
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// The default construction applies the crate-wide request timeout; transports built
/// from a custom [`ReqwestClient`] are responsible for configuring their own timeout.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport enforcing the provided per-request timeout.
	pub fn new(timeout: Duration) -> Result<Self, crate::error::ConfigError> {
		ReqwestClient::builder()
			.timeout(timeout)
			.build()
			.map(Self)
			.map_err(crate::error::ConfigError::http_client_build)
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl SpvTransport for ReqwestTransport {
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.method {
				Method::Get => reqwest::Method::GET,
				Method::Post => reqwest::Method::POST,
				Method::Put => reqwest::Method::PUT,
				Method::Delete => reqwest::Method::DELETE,
			};
			let mut builder = client.request(method, request.url);

			if let Some(bearer) = &request.bearer {
				builder = builder.header(AUTHORIZATION, format!("Bearer {}", bearer.expose()));
			}
			if let Some(content_type) = request.content_type {
				builder = builder.header(CONTENT_TYPE, content_type);
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await.map_err(map_reqwest_error)?;
			let status = response.status().as_u16();
			let headers = response.headers().to_owned();
			let retry_after = parse_retry_after(&headers);
			let content_type = headers
				.get(CONTENT_TYPE)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);
			let body = response.bytes().await.map_err(map_reqwest_error)?.to_vec();

			Ok(ApiResponse { status, retry_after, content_type, body })
		})
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError) -> TransportError {
	if err.is_timeout() { TransportError::Timeout } else { TransportError::network(err) }
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;

	parse_retry_after_value(value.to_str().ok()?)
}

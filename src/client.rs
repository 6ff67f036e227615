//! Typed request facade over the SPV API.
//!
//! [`SpvClient`] composes the collaborators the rest of the crate defines: every verb
//! reads the bearer secret from the [`TokenStore`], funnels the attempt through the
//! shared [`RateLimiter`], classifies the outcome per [`RetryClass`], and decorates the
//! final result with the [`MockFallback`] layer. Callers receive exactly one resolved
//! value or one error per logical call and never implement their own retry loop.

// crates.io
use serde::de::DeserializeOwned;
use tokio::time::sleep;
// self
use crate::{
	_prelude::*,
	auth::{TokenStore, UnauthorizedHandler},
	config::ClientConfig,
	error::{ConfigError, TransientError},
	http::{ApiRequest, ApiResponse, Method, SpvTransport},
	limiter::RateLimiter,
	mock::MockFallback,
	obs::{self, RequestOutcome, RequestSpan, RetryReason},
	retry::{RetryClass, RetryPolicy},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

const CONTENT_TYPE_JSON: &str = "application/json";
const CLIENT_ERROR_FALLBACK: &str = "The request was rejected by the server.";
const DIAGNOSTIC_LIMIT: usize = 256;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestSpvClient = SpvClient<ReqwestTransport>;

/// Binary artifact produced by [`SpvClient::download`].
///
/// The buffer is owned outright; there is no external handle to release once the value
/// drops, unlike the object URLs the browser-based original had to revoke by hand.
#[derive(Clone, Debug)]
pub struct Download {
	/// Name the caller wants the artifact saved under.
	pub filename: String,
	/// `Content-Type` reported by the server, when present.
	pub content_type: Option<String>,
	/// Raw artifact bytes (typically signed XML).
	pub bytes: Vec<u8>,
}
impl Download {
	/// Returns the artifact size in bytes.
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	/// True when the server returned an empty body.
	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}
}

/// Rate-limited, retrying facade over one SPV deployment.
///
/// The client owns the transport, pacing, and retry state so e-Factura operations can
/// focus on endpoint shapes. Cloning is deliberately not offered: one instance per
/// process keeps the rate limiter a single shared bottleneck.
pub struct SpvClient<T>
where
	T: ?Sized + SpvTransport,
{
	/// HTTP transport executing individual attempts.
	pub transport: Arc<T>,
	/// Token storage read per attempt and cleared on 401.
	pub tokens: Arc<dyn TokenStore>,
	/// Hook fired after a 401 has cleared the stored credential.
	pub unauthorized: Arc<dyn UnauthorizedHandler>,
	config: ClientConfig,
	limiter: RateLimiter,
	retry: RetryPolicy,
	mock: MockFallback,
}
impl<T> SpvClient<T>
where
	T: ?Sized + SpvTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(
		config: ClientConfig,
		transport: impl Into<Arc<T>>,
		tokens: Arc<dyn TokenStore>,
		unauthorized: Arc<dyn UnauthorizedHandler>,
	) -> Self {
		let limiter = RateLimiter::new(config.rate_limit_delay);
		let retry = RetryPolicy::from_config(&config);
		let mock = MockFallback::from_config(&config);

		Self { transport: transport.into(), tokens, unauthorized, config, limiter, retry, mock }
	}

	/// Returns the active configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Issues a GET request, decoding the JSON response into `R`.
	pub async fn get<R>(&self, path: &str, mock: Option<R>) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.request(Method::Get, path, None, mock).await
	}

	/// Issues a POST request with a JSON body, decoding the JSON response into `R`.
	pub async fn post<B, R>(&self, path: &str, body: &B, mock: Option<R>) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let body = serde_json::to_vec(body).map_err(ConfigError::Serialize)?;

		self.request(Method::Post, path, Some(body), mock).await
	}

	/// Issues a PUT request with a JSON body, decoding the JSON response into `R`.
	pub async fn put<B, R>(&self, path: &str, body: &B, mock: Option<R>) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let body = serde_json::to_vec(body).map_err(ConfigError::Serialize)?;

		self.request(Method::Put, path, Some(body), mock).await
	}

	/// Issues a DELETE request, decoding the JSON response into `R`.
	pub async fn delete<R>(&self, path: &str, mock: Option<R>) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.request(Method::Delete, path, None, mock).await
	}

	/// Fetches binary content and wraps it as a client-side [`Download`].
	///
	/// Binary artifacts are never mocked, so this path skips the fallback layer
	/// entirely; retry and pacing semantics are identical to the JSON verbs.
	pub async fn download(&self, path: &str, filename: impl Into<String>) -> Result<Download> {
		let url = self.endpoint(path)?;
		let response = self.execute_with_retry(Method::Get, &url, None, None).await?;

		Ok(Download {
			filename: filename.into(),
			content_type: response.content_type,
			bytes: response.body,
		})
	}

	async fn request<R>(
		&self,
		method: Method,
		path: &str,
		body: Option<Vec<u8>>,
		mock: Option<R>,
	) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let url = self.endpoint(path)?;

		if self.mock.preempts(&mock)
			&& let Some(payload) = mock
		{
			return Ok(self.mock.serve(payload).await);
		}

		match self.execute_json(method, &url, body).await {
			Ok(value) => Ok(value),
			Err(err) => match mock {
				Some(payload) if self.mock.recovers(&err) => {
					obs::warn_mock_fallback(url.path());

					Ok(self.mock.serve(payload).await)
				},
				_ => Err(err),
			},
		}
	}

	async fn execute_json<R>(&self, method: Method, url: &Url, body: Option<Vec<u8>>) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let content_type = body.as_ref().map(|_| CONTENT_TYPE_JSON);
		let response = self.execute_with_retry(method, url, body, content_type).await?;
		let mut deserializer = serde_json::Deserializer::from_slice(&response.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::Decode { url: url.to_string(), source })
	}

	async fn execute_with_retry(
		&self,
		method: Method,
		url: &Url,
		body: Option<Vec<u8>>,
		content_type: Option<&'static str>,
	) -> Result<ApiResponse> {
		let span = RequestSpan::new(method, url.path());

		obs::record_request_outcome(method, RequestOutcome::Attempt);

		let result = span.instrument(self.retry_loop(method, url, body, content_type)).await;

		match &result {
			Ok(_) => obs::record_request_outcome(method, RequestOutcome::Success),
			Err(_) => obs::record_request_outcome(method, RequestOutcome::Failure),
		}

		result
	}

	/// Explicit retry state machine: one iteration per HTTP attempt, every attempt
	/// paced through the shared limiter, bounded both by the transient retry cap and
	/// the 429 wait budget.
	async fn retry_loop(
		&self,
		method: Method,
		url: &Url,
		body: Option<Vec<u8>>,
		content_type: Option<&'static str>,
	) -> Result<ApiResponse> {
		let mut transient_failures = 0u32;
		let mut throttled_total = Duration::ZERO;

		loop {
			self.limiter.pace().await;

			let request = ApiRequest {
				method,
				url: url.clone(),
				content_type,
				body: body.clone(),
				bearer: self.tokens.bearer(),
			};

			match self.transport.execute(request).await {
				Ok(response) if response.is_success() => return Ok(response),
				Ok(response) => match RetryClass::of(response.status) {
					RetryClass::Unauthorized => {
						self.tokens.clear();
						self.unauthorized.on_unauthorized();

						return Err(Error::Unauthorized);
					},
					RetryClass::Throttled => {
						let wait =
							response.retry_after.unwrap_or(self.retry.default_retry_after);

						// Advice is attacker-controlled; the sum must not overflow.
						if throttled_total.saturating_add(wait) > self.retry.throttle_budget {
							return Err(Error::RateLimited { retry_after: wait });
						}

						throttled_total = throttled_total.saturating_add(wait);
						obs::record_retry(RetryReason::Throttled);
						sleep(wait).await;
					},
					RetryClass::Transient => {
						if transient_failures >= self.retry.max_retries {
							return Err(TransientError::Unavailable {
								status: response.status,
								attempts: transient_failures + 1,
							}
							.into());
						}

						transient_failures += 1;
						obs::record_retry(RetryReason::Transient);
						sleep(self.retry.backoff_delay(transient_failures)).await;
					},
					RetryClass::Client => {
						return Err(Error::Client {
							status: response.status,
							friendly_message: friendly_message(&response.body),
						});
					},
					RetryClass::Unexpected => {
						let message = diagnostic_message(&response.body);

						obs::log_unexpected_response(
							method,
							url,
							Some(response.status),
							&message,
						);

						return Err(Error::Unexpected {
							method,
							url: url.to_string(),
							status: Some(response.status),
							message,
						});
					},
				},
				// Timeouts and network failures share the 503 backoff budget.
				Err(transport_error) => {
					if transient_failures >= self.retry.max_retries {
						return Err(transport_error.into());
					}

					transient_failures += 1;
					obs::record_retry(RetryReason::Transient);
					sleep(self.retry.backoff_delay(transient_failures)).await;
				},
			}
		}
	}

	fn endpoint(&self, path: &str) -> Result<Url> {
		self.config
			.base_url
			.join(path.trim_start_matches('/'))
			.map_err(|source| {
				ConfigError::InvalidEndpoint { path: path.to_owned(), source }.into()
			})
	}
}
#[cfg(feature = "reqwest")]
impl SpvClient<ReqwestTransport> {
	/// Creates a client that provisions its own reqwest transport honoring the
	/// configured request timeout.
	pub fn new(
		config: ClientConfig,
		tokens: Arc<dyn TokenStore>,
		unauthorized: Arc<dyn UnauthorizedHandler>,
	) -> Result<Self> {
		let transport = ReqwestTransport::new(config.request_timeout)?;

		Ok(Self::with_transport(config, transport, tokens, unauthorized))
	}
}
impl<T> Debug for SpvClient<T>
where
	T: ?Sized + SpvTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SpvClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("rate_limit_delay", &self.config.rate_limit_delay)
			.field("max_retries", &self.retry.max_retries)
			.field("bearer_set", &self.tokens.bearer().is_some())
			.finish()
	}
}

/// Best-effort human-readable message for a 400 response.
fn friendly_message(body: &[u8]) -> String {
	#[derive(Deserialize)]
	struct ErrorBody {
		message: Option<String>,
		eroare: Option<String>,
		detail: Option<String>,
	}

	serde_json::from_slice::<ErrorBody>(body)
		.ok()
		.and_then(|parsed| parsed.message.or(parsed.eroare).or(parsed.detail))
		.map(|message| message.trim().to_owned())
		.filter(|message| !message.is_empty())
		.unwrap_or_else(|| CLIENT_ERROR_FALLBACK.to_owned())
}

/// Truncated lossy body text attached to unclassified failures.
fn diagnostic_message(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);
	let text = text.trim();

	if text.is_empty() {
		return "no response body".to_owned();
	}

	text.chars().take(DIAGNOSTIC_LIMIT).collect()
}

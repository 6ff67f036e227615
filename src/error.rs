//! Client-level error taxonomy shared across the facade, transport, and retry layers.
//!
//! The variants mirror how the facade classifies one HTTP attempt: credential problems
//! ([`Error::Unauthorized`]) and malformed requests ([`Error::Client`]) are final, throttling
//! ([`Error::RateLimited`]) and upstream unavailability ([`Error::Transient`],
//! [`Error::Transport`]) are retried internally before they ever reach a caller, and anything
//! the classifier cannot place lands in [`Error::Unexpected`] with its diagnostics attached.

// self
use crate::{_prelude::*, http::Method};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// Callers observe exactly one of these per logical request; every retry decision has
/// already been made by the time a variant surfaces.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure that outlived the retry budget.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS, timeout) that outlived the retry budget.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Stored credential was rejected with HTTP 401; it has been cleared locally and the
	/// unauthorized handler has already fired.
	#[error("Stored SPV credential was rejected; the session must be re-established.")]
	Unauthorized,
	/// Server-side throttling exceeded the configured total wait budget.
	#[error("SPV kept throttling the request beyond the configured wait budget.")]
	RateLimited {
		/// Last `Retry-After` advice received from the server.
		retry_after: Duration,
	},
	/// Request was rejected as invalid (HTTP 400); never retried.
	#[error("SPV rejected the request: {friendly_message}")]
	Client {
		/// HTTP status code that produced the rejection.
		status: u16,
		/// Best-effort human-readable message extracted from the response body.
		friendly_message: String,
	},
	/// Response could not be classified; diagnostics are preserved verbatim.
	#[error("SPV returned an unexpected response: {message}")]
	Unexpected {
		/// HTTP verb of the failing request.
		method: Method,
		/// Full request URL.
		url: String,
		/// HTTP status code, when one was received.
		status: Option<u16>,
		/// Raw diagnostic message.
		message: String,
	},
	/// Successful response carried a body that does not match the expected shape.
	#[error("Response body from {url} could not be decoded.")]
	Decode {
		/// Full request URL.
		url: String,
		/// Structured parsing failure, including the path of the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl Error {
	/// True when a caller-supplied mock payload may substitute for this failure.
	///
	/// Only availability-class failures qualify; credential ([`Error::Unauthorized`]) and
	/// input ([`Error::Client`]) problems always propagate so mocking never hides them.
	pub fn is_mock_recoverable(&self) -> bool {
		matches!(
			self,
			Self::Transient(_) | Self::Transport(_) | Self::Unexpected { .. } | Self::Decode { .. }
		)
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL is not an absolute http(s) URL.
	#[error("Base URL `{value}` is invalid; an absolute http(s) URL is required.")]
	InvalidBaseUrl {
		/// Offending configuration value.
		value: String,
		/// Underlying parsing failure, absent when the URL parsed but used a non-http scheme.
		#[source]
		source: Option<url::ParseError>,
	},
	/// Endpoint path cannot be joined onto the base URL.
	#[error("Endpoint path `{path}` cannot be joined onto the base URL.")]
	InvalidEndpoint {
		/// Offending path fragment.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Environment variable holds a value the loader cannot parse.
	#[error("Environment variable `{name}` holds an unparsable value `{value}`.")]
	InvalidEnvValue {
		/// Variable name.
		name: &'static str,
		/// Raw value found in the environment.
		value: String,
	},
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized to JSON.")]
	Serialize(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Temporary upstream failure variants (retried with exponential backoff).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Endpoint kept answering HTTP 503 until the retry budget ran out.
	#[error("SPV endpoint stayed unavailable after {attempts} attempts (HTTP {status}).")]
	Unavailable {
		/// Last HTTP status observed.
		status: u16,
		/// Total attempts made, including the first.
		attempts: u32,
	},
}

/// Transport-level failures (network, IO, timeout).
///
/// Every variant is treated as transient by the retry loop, matching the upstream
/// contract that timeouts and connection resets deserve the same backoff as HTTP 503.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Request timed out before the endpoint responded.
	#[error("Request timed out before the SPV endpoint responded.")]
	Timeout,
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the SPV endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the SPV endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}

//! Client configuration: builder-style setters plus environment loading.

// std
use std::{env, str::FromStr};
// self
use crate::{_prelude::*, error::ConfigError};

/// ANAF production e-Factura REST base. The upstream deployment used a browser-relative
/// `/api/v1` default, which has no meaning for a standalone client, so the live base is
/// the out-of-the-box target instead.
pub const DEFAULT_BASE_URL: &str = "https://api.anaf.ro/prod/FCTEL/rest/";
/// Default retry cap for transient failures (HTTP 503 and transport errors).
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default base delay for exponential backoff.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1_000);
/// Default minimum interval between dispatched requests (10 req/s).
pub const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_millis(100);
/// Default per-request transport timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Default total wall-clock budget spent waiting on HTTP 429 advice.
pub const DEFAULT_THROTTLE_BUDGET: Duration = Duration::from_secs(300);
/// Default wait applied when a 429 response carries no `Retry-After` header.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Environment variable names recognized by [`ClientConfig::from_env`].
pub mod env_keys {
	/// Absolute base URL of the SPV REST API.
	pub const API_BASE_URL: &str = "API_BASE_URL";
	/// Boolean switch enabling proactive mock mode.
	pub const USE_MOCK_DATA: &str = "USE_MOCK_DATA";
	/// Transient retry cap.
	pub const MAX_RETRIES: &str = "MAX_RETRIES";
	/// Exponential backoff base, in milliseconds.
	pub const RETRY_DELAY_MS: &str = "RETRY_DELAY_MS";
	/// Minimum inter-request interval, in milliseconds.
	pub const RATE_LIMIT_DELAY_MS: &str = "RATE_LIMIT_DELAY_MS";
	/// Per-request transport timeout, in milliseconds.
	pub const REQUEST_TIMEOUT_MS: &str = "REQUEST_TIMEOUT_MS";
	/// Total 429 wait budget, in milliseconds.
	pub const THROTTLE_BUDGET_MS: &str = "THROTTLE_BUDGET_MS";
}

/// Tunables for one [`SpvClient`](crate::client::SpvClient) instance.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Absolute base URL every endpoint path is joined onto; always ends with `/`.
	pub base_url: Url,
	/// Proactive mock mode: supplied mock payloads preempt live calls entirely.
	pub use_mock_data: bool,
	/// Whether a supplied mock payload may substitute for an availability-class failure.
	/// Production builds should disable this; see
	/// [`ClientConfig::without_fallback_on_error`].
	pub fallback_on_error: bool,
	/// Retry cap for transient failures.
	pub max_retries: u32,
	/// Exponential backoff base delay.
	pub retry_delay: Duration,
	/// Minimum interval between dispatched requests.
	pub rate_limit_delay: Duration,
	/// Per-request transport timeout.
	pub request_timeout: Duration,
	/// Total wall-clock budget spent honoring 429 `Retry-After` advice.
	pub throttle_budget: Duration,
}
impl ClientConfig {
	/// Creates a configuration with crate defaults, normalizing the base URL to end
	/// with a trailing slash so endpoint joining never drops its final path segment.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url: Self::normalize_base(base_url),
			use_mock_data: false,
			fallback_on_error: true,
			max_retries: DEFAULT_MAX_RETRIES,
			retry_delay: DEFAULT_RETRY_DELAY,
			rate_limit_delay: DEFAULT_RATE_LIMIT_DELAY,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			throttle_budget: DEFAULT_THROTTLE_BUDGET,
		}
	}

	/// Loads the configuration from process environment variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_env_pairs(env::vars())
	}

	/// Loads the configuration from an explicit variable table; unknown names are
	/// ignored and missing names fall back to crate defaults.
	pub fn from_env_pairs(
		pairs: impl IntoIterator<Item = (String, String)>,
	) -> Result<Self, ConfigError> {
		let mut base_url = None;
		let mut config = Self::new(Self::parse_base_url(DEFAULT_BASE_URL)?);

		for (name, value) in pairs {
			match name.as_str() {
				env_keys::API_BASE_URL => base_url = Some(Self::parse_base_url(&value)?),
				env_keys::USE_MOCK_DATA =>
					config.use_mock_data = parse_bool(env_keys::USE_MOCK_DATA, &value)?,
				env_keys::MAX_RETRIES =>
					config.max_retries = parse_number(env_keys::MAX_RETRIES, &value)?,
				env_keys::RETRY_DELAY_MS =>
					config.retry_delay = parse_millis(env_keys::RETRY_DELAY_MS, &value)?,
				env_keys::RATE_LIMIT_DELAY_MS =>
					config.rate_limit_delay = parse_millis(env_keys::RATE_LIMIT_DELAY_MS, &value)?,
				env_keys::REQUEST_TIMEOUT_MS =>
					config.request_timeout = parse_millis(env_keys::REQUEST_TIMEOUT_MS, &value)?,
				env_keys::THROTTLE_BUDGET_MS =>
					config.throttle_budget = parse_millis(env_keys::THROTTLE_BUDGET_MS, &value)?,
				_ => {},
			}
		}

		if let Some(base) = base_url {
			config.base_url = base;
		}

		Ok(config)
	}

	/// Enables proactive mock mode.
	pub fn with_mock_data(mut self) -> Self {
		self.use_mock_data = true;

		self
	}

	/// Disables fallback-on-error so live failures always propagate; recommended for
	/// production builds.
	pub fn without_fallback_on_error(mut self) -> Self {
		self.fallback_on_error = false;

		self
	}

	/// Overrides the transient retry cap.
	pub fn with_max_retries(mut self, max_retries: u32) -> Self {
		self.max_retries = max_retries;

		self
	}

	/// Overrides the exponential backoff base delay.
	pub fn with_retry_delay(mut self, delay: Duration) -> Self {
		self.retry_delay = delay;

		self
	}

	/// Overrides the minimum inter-request interval.
	pub fn with_rate_limit_delay(mut self, interval: Duration) -> Self {
		self.rate_limit_delay = interval;

		self
	}

	/// Overrides the per-request transport timeout.
	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Overrides the total 429 wait budget.
	pub fn with_throttle_budget(mut self, budget: Duration) -> Self {
		self.throttle_budget = budget;

		self
	}

	fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
		let url = Url::parse(value).map_err(|source| ConfigError::InvalidBaseUrl {
			value: value.to_owned(),
			source: Some(source),
		})?;

		if !matches!(url.scheme(), "http" | "https") {
			return Err(ConfigError::InvalidBaseUrl { value: value.to_owned(), source: None });
		}

		Ok(Self::normalize_base(url))
	}

	fn normalize_base(mut url: Url) -> Url {
		if !url.path().ends_with('/') {
			let path = format!("{}/", url.path());

			url.set_path(&path);
		}

		url
	}
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" => Ok(true),
		"0" | "false" | "no" | "" => Ok(false),
		_ => Err(ConfigError::InvalidEnvValue { name, value: value.to_owned() }),
	}
}

fn parse_number<N>(name: &'static str, value: &str) -> Result<N, ConfigError>
where
	N: FromStr,
{
	value
		.trim()
		.parse()
		.map_err(|_| ConfigError::InvalidEnvValue { name, value: value.to_owned() })
}

fn parse_millis(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
	parse_number::<u64>(name, value).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
		entries.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
	}

	#[test]
	fn defaults_match_the_documented_contract() {
		let config = ClientConfig::from_env_pairs(Vec::new())
			.expect("Empty environment should produce defaults.");

		assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
		assert!(!config.use_mock_data);
		assert!(config.fallback_on_error);
		assert_eq!(config.max_retries, 3);
		assert_eq!(config.retry_delay, Duration::from_millis(1_000));
		assert_eq!(config.rate_limit_delay, Duration::from_millis(100));
		assert_eq!(config.request_timeout, Duration::from_secs(30));
		assert_eq!(config.throttle_budget, Duration::from_secs(300));
	}

	#[test]
	fn environment_overrides_apply() {
		let config = ClientConfig::from_env_pairs(pairs(&[
			("API_BASE_URL", "https://spv.example.com/api/v1"),
			("USE_MOCK_DATA", "true"),
			("MAX_RETRIES", "5"),
			("RETRY_DELAY_MS", "250"),
			("RATE_LIMIT_DELAY_MS", "50"),
			("REQUEST_TIMEOUT_MS", "10000"),
			("THROTTLE_BUDGET_MS", "60000"),
		]))
		.expect("Well-formed environment should parse.");

		assert_eq!(config.base_url.as_str(), "https://spv.example.com/api/v1/");
		assert!(config.use_mock_data);
		assert_eq!(config.max_retries, 5);
		assert_eq!(config.retry_delay, Duration::from_millis(250));
		assert_eq!(config.rate_limit_delay, Duration::from_millis(50));
		assert_eq!(config.request_timeout, Duration::from_secs(10));
		assert_eq!(config.throttle_budget, Duration::from_secs(60));
	}

	#[test]
	fn relative_base_urls_are_rejected() {
		let err = ClientConfig::from_env_pairs(pairs(&[("API_BASE_URL", "/api/v1")]))
			.expect_err("A browser-relative base URL must be rejected.");

		assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
	}

	#[test]
	fn non_http_schemes_are_rejected() {
		let err = ClientConfig::from_env_pairs(pairs(&[("API_BASE_URL", "ftp://spv.example.com")]))
			.expect_err("Non-http(s) schemes must be rejected.");

		assert!(matches!(err, ConfigError::InvalidBaseUrl { source: None, .. }));
	}

	#[test]
	fn out_of_range_retry_caps_are_rejected() {
		let err = ClientConfig::from_env_pairs(pairs(&[("MAX_RETRIES", "4294967296")]))
			.expect_err("A retry cap beyond u32 must be rejected, not truncated.");

		assert!(matches!(err, ConfigError::InvalidEnvValue { name: "MAX_RETRIES", .. }));
	}

	#[test]
	fn malformed_booleans_are_rejected() {
		let err = ClientConfig::from_env_pairs(pairs(&[("USE_MOCK_DATA", "da")]))
			.expect_err("Unknown boolean spellings must be rejected.");

		assert!(matches!(err, ConfigError::InvalidEnvValue { name: "USE_MOCK_DATA", .. }));
	}
}

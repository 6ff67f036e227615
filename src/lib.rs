//! Rate-limited, retrying HTTP client for Romania's ANAF SPV e-Factura API—FIFO request
//! pacing, status-aware backoff, and mock fallback behind one typed facade.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod efactura;
pub mod error;
pub mod http;
pub mod limiter;
pub mod mock;
pub mod obs;
pub mod retry;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for the crate's own unit and integration tests; not
	//! part of the supported API surface.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{LoginRedirect, MemoryTokenStore, TokenSecret, TokenStore, UnauthorizedHandler},
		client::SpvClient,
		config::ClientConfig,
		http::ReqwestTransport,
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = SpvClient<ReqwestTransport>;

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Test configuration with millisecond-scale pacing so suites stay fast.
	pub fn test_config(base_url: &str) -> ClientConfig {
		let base = Url::parse(base_url).expect("Test base URL should parse.");

		ClientConfig::new(base)
			.with_retry_delay(Duration::from_millis(10))
			.with_rate_limit_delay(Duration::from_millis(1))
			.with_throttle_budget(Duration::from_secs(10))
	}

	/// Constructs an [`SpvClient`] backed by a seeded memory token store, a recording login
	/// redirect, and the reqwest transport used across integration tests.
	pub fn build_test_client(
		config: ClientConfig,
	) -> (ReqwestTestClient, Arc<MemoryTokenStore>, Arc<LoginRedirect>) {
		let tokens = Arc::new(MemoryTokenStore::default());

		tokens.store(TokenSecret::new("test-bearer"));
		tokens.store_legacy(TokenSecret::new("legacy-bearer"));

		let redirect = Arc::new(LoginRedirect::new("/login", "/efactura"));
		let store: Arc<dyn TokenStore> = tokens.clone();
		let handler: Arc<dyn UnauthorizedHandler> = redirect.clone();
		let client = SpvClient::with_transport(config, test_reqwest_transport(), store, handler);

		(client, tokens, redirect)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};

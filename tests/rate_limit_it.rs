//! Request pacing over a live mock gateway.
//!
//! Exact interval math lives in the paused-clock limiter unit tests; these suites only
//! confirm the pacing applies across concurrent facade calls on a real clock.

// std
use std::time::Instant;
// crates.io
use httpmock::prelude::*;
// self
use spv_client::_preludet::*;

#[derive(Debug, Deserialize)]
struct Probe {
	#[allow(dead_code)]
	ok: bool,
}

#[tokio::test]
async fn concurrent_calls_are_spaced_by_the_configured_interval() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/efactura/ping");
			then.status(200).header("content-type", "application/json").body(r#"{"ok":true}"#);
		})
		.await;
	let config =
		test_config(&server.base_url()).with_rate_limit_delay(Duration::from_millis(50));
	let (client, _tokens, _redirect) = build_test_client(config);
	let started = Instant::now();
	let (a, b, c, d) = tokio::join!(
		client.get::<Probe>("efactura/ping", None),
		client.get::<Probe>("efactura/ping", None),
		client.get::<Probe>("efactura/ping", None),
		client.get::<Probe>("efactura/ping", None),
	);

	a.expect("First concurrent call must succeed.");
	b.expect("Second concurrent call must succeed.");
	c.expect("Third concurrent call must succeed.");
	d.expect("Fourth concurrent call must succeed.");

	// Three inter-request gaps of at least 50ms each.
	assert!(
		started.elapsed() >= Duration::from_millis(150),
		"Four paced calls must take at least 150ms, got {:?}.",
		started.elapsed(),
	);

	mock.assert_calls_async(4).await;
}

#[tokio::test]
async fn retried_attempts_are_paced_as_well() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/efactura/ping");
			then.status(503);
		})
		.await;
	let config = test_config(&server.base_url())
		.with_rate_limit_delay(Duration::from_millis(50))
		.with_retry_delay(Duration::from_millis(1));
	let (client, _tokens, _redirect) = build_test_client(config);
	let started = Instant::now();
	let _ = client
		.get::<Probe>("efactura/ping", None)
		.await
		.expect_err("A persistently unavailable endpoint must fail.");

	// Backoff is negligible here, so the observable floor is the pacing interval
	// applied to each of the three retries.
	assert!(
		started.elapsed() >= Duration::from_millis(150),
		"Retries must pass through the limiter, got {:?}.",
		started.elapsed(),
	);

	mock.assert_calls_async(4).await;
}

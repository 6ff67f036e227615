//! Binary download behavior: owned bytes, metadata, and shared retry semantics.

// crates.io
use httpmock::prelude::*;
// self
use spv_client::{_preludet::*, error::TransientError};

const SIGNED_XML: &[u8] = b"<?xml version=\"1.0\"?><semnatura>ANAF</semnatura>";

#[tokio::test]
async fn downloads_capture_bytes_and_metadata() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/efactura/download/777")
				.header("authorization", "Bearer test-bearer");
			then.status(200).header("content-type", "application/xml").body(SIGNED_XML);
		})
		.await;
	let (client, _tokens, _redirect) = build_test_client(test_config(&server.base_url()));
	let download = client
		.download_response("777", "raspuns-777.xml")
		.await
		.expect("Downloading a finished submission must succeed.");

	assert_eq!(download.filename, "raspuns-777.xml");
	assert_eq!(download.content_type.as_deref(), Some("application/xml"));
	assert_eq!(download.bytes, SIGNED_XML);
	assert_eq!(download.len(), SIGNED_XML.len());
	assert!(!download.is_empty());

	mock.assert_async().await;
}

#[tokio::test]
async fn downloads_share_the_transient_retry_budget() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/efactura/download/777");
			then.status(503);
		})
		.await;
	let (client, _tokens, _redirect) = build_test_client(test_config(&server.base_url()));
	let err = client
		.download_response("777", "raspuns-777.xml")
		.await
		.expect_err("A persistently unavailable download must fail like any other call.");

	assert!(matches!(
		err,
		Error::Transient(TransientError::Unavailable { status: 503, attempts: 4 }),
	));

	mock.assert_calls_async(4).await;
}

#[tokio::test]
async fn empty_download_bodies_are_reported_as_such() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/efactura/download/778");
			then.status(200).header("content-type", "application/zip");
		})
		.await;
	let (client, _tokens, _redirect) = build_test_client(test_config(&server.base_url()));
	let download = client
		.download_response("778", "arhiva.zip")
		.await
		.expect("An empty 200 body is still a successful download.");

	assert!(download.is_empty());
	assert_eq!(download.len(), 0);

	mock.assert_async().await;
}

//! End-to-end e-Factura operations against a mock SPV gateway.

// crates.io
use httpmock::prelude::*;
// self
use spv_client::{
	_preludet::*,
	efactura::{InvoiceSubmission, MessageList, SubmissionState, SubmissionStatus},
};

#[tokio::test]
async fn invoice_submission_posts_the_ubl_document() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/efactura/upload")
				.header("authorization", "Bearer test-bearer")
				.header("content-type", "application/json")
				.json_body_includes(r#"{"cif":"RO123456","standard":"UBL"}"#);
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"index_incarcare":"5001","data_incarcare":"202608231030"}"#);
		})
		.await;
	let (client, _tokens, _redirect) = build_test_client(test_config(&server.base_url()));
	let submission = InvoiceSubmission::ubl("<Invoice/>", "RO123456");
	let receipt = client
		.submit_invoice(&submission, None)
		.await
		.expect("A valid submission must be acknowledged.");

	assert_eq!(receipt.upload_index, "5001");
	assert_eq!(receipt.uploaded_at.as_deref(), Some("202608231030"));

	mock.assert_async().await;
}

#[tokio::test]
async fn status_polling_reads_the_anaf_vocabulary() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			// Body-less verbs must not announce a content type.
			when.method(GET).path("/efactura/status/5001").header_missing("content-type");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"stare":"ok","id_descarcare":"777"}"#);
		})
		.await;
	let (client, _tokens, _redirect) = build_test_client(test_config(&server.base_url()));
	let status = client
		.submission_status("5001", None)
		.await
		.expect("Polling a known upload index must succeed.");

	assert_eq!(status.state, SubmissionState::Accepted);
	assert!(status.state.is_final());
	assert_eq!(status.download_id.as_deref(), Some("777"));

	mock.assert_async().await;
}

#[tokio::test]
async fn message_listing_carries_cif_and_day_window() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/efactura/messages")
				.query_param("cif", "RO123456")
				.query_param("zile", "30");
			then.status(200).header("content-type", "application/json").body(
				r#"{
					"mesaje": [{
						"id": "m-1",
						"cif": "RO123456",
						"tip": "FACTURA TRIMISA",
						"detalii": "Factura cu index 5001",
						"data_creare": "202608221200",
						"id_solicitare": "5001"
					}],
					"serial": "s-1",
					"titlu": "Lista Mesaje"
				}"#,
			);
		})
		.await;
	let (client, _tokens, _redirect) = build_test_client(test_config(&server.base_url()));
	let listing = client
		.list_messages("RO123456", 30, None)
		.await
		.expect("Listing inbox messages must succeed.");

	assert_eq!(listing.messages.len(), 1);
	assert_eq!(listing.messages[0].kind, "FACTURA TRIMISA");
	assert_eq!(listing.messages[0].request_id.as_deref(), Some("5001"));
	assert_eq!(listing.title.as_deref(), Some("Lista Mesaje"));

	mock.assert_async().await;
}

#[tokio::test]
async fn proactive_mock_covers_typed_operations_too() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/efactura/status/5001");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"stare":"nok"}"#);
		})
		.await;
	let config = test_config(&server.base_url()).with_mock_data();
	let (client, _tokens, _redirect) = build_test_client(config);
	let canned = SubmissionStatus { state: SubmissionState::Processing, download_id: None };
	let status = client
		.submission_status("5001", Some(canned))
		.await
		.expect("The canned status must be served.");

	assert_eq!(status.state, SubmissionState::Processing);

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn empty_inbox_listings_deserialize() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/efactura/messages");
			then.status(200).header("content-type", "application/json").body(r#"{}"#);
		})
		.await;
	let (client, _tokens, _redirect) = build_test_client(test_config(&server.base_url()));
	let listing: MessageList = client
		.list_messages("RO123456", 30, None)
		.await
		.expect("An empty inbox must still deserialize.");

	assert!(listing.messages.is_empty());

	mock.assert_async().await;
}

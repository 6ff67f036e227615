//! Typed e-Factura operations built on the facade verbs.
//!
//! Field names follow the ANAF JSON vocabulary (`index_incarcare`, `stare`,
//! `id_descarcare`, …) so payloads round-trip against the SPV gateway unchanged.

// self
use crate::{_prelude::*, client::Download, http::SpvTransport};

/// Invoice payload submitted for validation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InvoiceSubmission {
	/// UBL invoice XML document.
	pub xml: String,
	/// Fiscal identification code (CIF/CUI) of the issuer.
	pub cif: String,
	/// Document standard; `UBL` unless the caller overrides it.
	#[serde(default = "default_standard")]
	pub standard: String,
}
impl InvoiceSubmission {
	/// Creates a UBL submission for the given issuer.
	pub fn ubl(xml: impl Into<String>, cif: impl Into<String>) -> Self {
		Self { xml: xml.into(), cif: cif.into(), standard: default_standard() }
	}
}

fn default_standard() -> String {
	"UBL".into()
}

/// Acknowledgement returned when an invoice enters the SPV processing queue.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmissionReceipt {
	/// Upload index used for all later status polling.
	#[serde(rename = "index_incarcare")]
	pub upload_index: String,
	/// Upload timestamp as reported by the gateway.
	#[serde(rename = "data_incarcare", default)]
	pub uploaded_at: Option<String>,
}

/// Processing state of one submitted invoice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionState {
	/// Validation has not finished; keep polling.
	#[serde(rename = "in prelucrare")]
	Processing,
	/// Invoice was accepted; a signed response is available for download.
	#[serde(rename = "ok")]
	Accepted,
	/// Invoice was rejected; the error report is available for download.
	#[serde(rename = "nok")]
	Rejected,
}
impl SubmissionState {
	/// True once polling can stop.
	pub const fn is_final(self) -> bool {
		!matches!(self, SubmissionState::Processing)
	}
}

/// Poll result for one upload index.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmissionStatus {
	/// Current processing state.
	#[serde(rename = "stare")]
	pub state: SubmissionState,
	/// Download identifier for the signed response or error report, once final.
	#[serde(rename = "id_descarcare", default)]
	pub download_id: Option<String>,
}

/// One SPV inbox message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpvMessage {
	/// Message identifier.
	pub id: String,
	/// Fiscal identification code the message belongs to.
	pub cif: String,
	/// Message category as reported by SPV (e.g. `FACTURA TRIMISA`).
	#[serde(rename = "tip")]
	pub kind: String,
	/// Free-form message details.
	#[serde(rename = "detalii")]
	pub details: String,
	/// Creation timestamp as reported by SPV.
	#[serde(rename = "data_creare")]
	pub created_at: String,
	/// Upload index the message refers to, when applicable.
	#[serde(rename = "id_solicitare", default)]
	pub request_id: Option<String>,
}

/// Inbox listing for one fiscal identification code.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MessageList {
	/// Messages in reverse-chronological order.
	#[serde(rename = "mesaje", default)]
	pub messages: Vec<SpvMessage>,
	/// Listing serial reported by the gateway.
	#[serde(default)]
	pub serial: Option<String>,
	/// Listing title reported by the gateway.
	#[serde(rename = "titlu", default)]
	pub title: Option<String>,
}

impl<T> crate::client::SpvClient<T>
where
	T: ?Sized + SpvTransport,
{
	/// Submits an invoice for validation, returning the upload index to poll.
	pub async fn submit_invoice(
		&self,
		submission: &InvoiceSubmission,
		mock: Option<SubmissionReceipt>,
	) -> Result<SubmissionReceipt> {
		self.post("efactura/upload", submission, mock).await
	}

	/// Polls the processing state of a previous submission.
	pub async fn submission_status(
		&self,
		upload_index: &str,
		mock: Option<SubmissionStatus>,
	) -> Result<SubmissionStatus> {
		self.get(&format!("efactura/status/{upload_index}"), mock).await
	}

	/// Lists inbox messages for a fiscal identification code over the last `days` days.
	pub async fn list_messages(
		&self,
		cif: &str,
		days: u32,
		mock: Option<MessageList>,
	) -> Result<MessageList> {
		self.get(&format!("efactura/messages?cif={cif}&zile={days}"), mock).await
	}

	/// Downloads the signed response (or error report) for a finished submission.
	pub async fn download_response(
		&self,
		download_id: &str,
		filename: impl Into<String>,
	) -> Result<Download> {
		self.download(&format!("efactura/download/{download_id}"), filename).await
	}
}

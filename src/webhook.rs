//! Inbound webhook authentication.
//!
//! The provider signs each webhook with HMAC-SHA256 over the exact request body, keyed
//! with the deployment's API secret, and sends `v1=<hex digest>` in the
//! [`SIGNATURE_HEADER`] header. Verification must run on the raw bytes as received:
//! re-serializing parsed JSON changes whitespace and key order and breaks the digest.

// crates.io
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;
// self
use crate::{
	_prelude::*,
	auth::SecretString,
	error::ConfigError,
	obs::{self, FlowKind, FlowSpan},
};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the provider's webhook signature.
pub const SIGNATURE_HEADER: &str = "X-WEBHOOK-SIGN";

const SIGNATURE_PREFIX: &str = "v1=";

/// Computes `v1=` + hex(HMAC-SHA256(`secret`, `raw_body`)).
pub fn compute_signature(raw_body: &[u8], secret: &[u8]) -> Result<String> {
	if secret.is_empty() {
		return Err(Error::MissingSecret);
	}

	let mut mac = <HmacSha256 as Mac>::new_from_slice(secret)
		.map_err(|_| ConfigError::InvalidWebhookSecret)?;

	mac.update(raw_body);

	Ok(format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes())))
}

/// Returns `Ok(true)` iff `provided_signature` equals the signature computed over
/// `raw_body`; mismatches are `Ok(false)`, never errors.
pub fn verify(raw_body: &[u8], provided_signature: &str, secret: &[u8]) -> Result<bool> {
	let expected = compute_signature(raw_body, secret)?;

	Ok(expected.as_bytes().ct_eq(provided_signature.as_bytes()).into())
}

/// Fields of a webhook payload worth logging.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSummary {
	/// Event type, e.g. `task-status-updated`.
	#[serde(default)]
	pub event_type: Option<String>,
	/// Status carried by the event, when present.
	#[serde(default)]
	pub status: Option<String>,
}
impl WebhookSummary {
	/// Extracts the summary from a raw body.
	///
	/// Each field is read on its own: a field that is missing or not a string stays
	/// `None` without discarding the other, and bodies that are not JSON yield an empty
	/// summary.
	pub fn from_raw(raw_body: &[u8]) -> Self {
		let Ok(value) = serde_json::from_slice::<Value>(raw_body) else {
			return Self::default();
		};
		let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_owned);

		Self { event_type: field("event_type"), status: field("status") }
	}
}

/// Result of [`WebhookVerifier::inspect`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookInspection {
	/// Whether the provided signature matched.
	pub signature_match: bool,
	/// Loggable payload fields.
	pub summary: WebhookSummary,
}

/// Webhook verifier bound to the deployment's shared secret.
#[derive(Clone, Debug)]
pub struct WebhookVerifier {
	secret: SecretString,
}
impl WebhookVerifier {
	/// Creates a verifier for the given shared secret.
	pub fn new(secret: impl Into<SecretString>) -> Self {
		Self { secret: secret.into() }
	}

	/// Computes the signature the provider would send for `raw_body`.
	pub fn sign(&self, raw_body: &[u8]) -> Result<String> {
		compute_signature(raw_body, self.secret.expose().as_bytes())
	}

	/// Boolean verification; see [`verify`].
	pub fn verify(&self, raw_body: &[u8], provided_signature: &str) -> Result<bool> {
		verify(raw_body, provided_signature, self.secret.expose().as_bytes())
	}

	/// Verifies and logs the webhook without rejecting it.
	///
	/// A missing header counts as a mismatch. Callers acknowledge the webhook regardless of
	/// the outcome; use [`authenticate`](Self::authenticate) to reject mismatches.
	pub fn inspect(
		&self,
		raw_body: &[u8],
		provided_signature: Option<&str>,
	) -> Result<WebhookInspection> {
		let _span = FlowSpan::new(FlowKind::Webhook, "inspect").entered();
		let signature_match = match provided_signature {
			Some(signature) => self.verify(raw_body, signature)?,
			None => {
				self.sign(raw_body)?;

				false
			},
		};
		let summary = WebhookSummary::from_raw(raw_body);

		obs::log_webhook(summary.event_type.as_deref(), summary.status.as_deref(), signature_match);

		Ok(WebhookInspection { signature_match, summary })
	}

	/// Strict verification: fails with [`Error::InvalidSignature`] on mismatch.
	pub fn authenticate(
		&self,
		raw_body: &[u8],
		provided_signature: Option<&str>,
	) -> Result<WebhookSummary> {
		let inspection = self.inspect(raw_body, provided_signature)?;

		if inspection.signature_match {
			Ok(inspection.summary)
		} else {
			Err(Error::InvalidSignature)
		}
	}
}

//! Access token model returned by the link token exchange.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	auth::{LinkId, SecretString},
};

/// Credential pair produced by exchanging a link token.
///
/// Only the access token and link identifier drive broker behavior; every other
/// field the provider returns is kept verbatim in [`extra`](Self::extra) so callers
/// can forward the full response to their clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
	/// Access token used for subsequent provider calls within the session.
	pub access_token: SecretString,
	/// Identifier of the linked payroll account.
	pub link_id: LinkId,
	/// Remaining provider fields.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl AccessTokenResponse {
	/// Builds a response carrying no extra provider fields.
	pub fn new(access_token: impl Into<SecretString>, link_id: LinkId) -> Self {
		Self { access_token: access_token.into(), link_id, extra: Map::new() }
	}

	/// Returns `true` when the response carries a usable access token.
	pub fn has_access_token(&self) -> bool {
		!self.access_token.is_empty()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn extra_provider_fields_are_preserved() {
		let payload = r#"{"access_token":"at-1","link_id":"link-1","expires_in":3600}"#;
		let response: AccessTokenResponse =
			serde_json::from_str(payload).expect("Exchange payload should deserialize.");

		assert!(response.has_access_token());
		assert_eq!(response.link_id.as_ref(), "link-1");
		assert_eq!(response.extra.get("expires_in"), Some(&Value::from(3600)));
		assert!(!format!("{response:?}").contains("at-1"));
	}
}

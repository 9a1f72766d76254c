//! Deployment configuration read once at process start.

// self
use crate::{
	_prelude::*,
	auth::SecretString,
	error::ConfigError,
	provider::ProductType,
	webhook::WebhookVerifier,
};

/// How bridge tokens are issued for new verification sessions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuanceMode {
	#[default]
	/// Create a user, then a bridge token for that user.
	User,
	/// Create an order, which carries its own bridge token.
	Order,
}
impl IssuanceMode {
	/// Interprets the `IS_ORDER` flag; only a case-insensitive `true` selects orders.
	pub fn from_flag(flag: Option<&str>) -> Self {
		match flag {
			Some(value) if value.trim().eq_ignore_ascii_case("true") => Self::Order,
			_ => Self::User,
		}
	}
}

/// Immutable deployment inputs consumed by the broker.
#[derive(Clone, Debug, PartialEq)]
pub struct BrokerConfig {
	/// Provider client identifier (`API_CLIENT_ID`).
	pub client_id: String,
	/// Provider API secret (`API_SECRET`); also the webhook signing key.
	pub secret: SecretString,
	/// Product selecting the refresh dispatch branch (`API_PRODUCT_TYPE`).
	pub product: ProductType,
	/// Bridge token issuance mode (`IS_ORDER`).
	pub issuance: IssuanceMode,
	/// Provider API base URL (`API_BASE_URL`).
	pub base_url: Url,
}
impl BrokerConfig {
	/// Provider API base URL used when `API_BASE_URL` is unset.
	pub const DEFAULT_BASE_URL: &'static str = "https://prod.truv.com/v1/";

	/// Reads the configuration from the process environment.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads the configuration through an arbitrary variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let required = |name: &'static str| {
			lookup(name)
				.filter(|value| !value.trim().is_empty())
				.ok_or(ConfigError::MissingVariable { name })
		};
		let client_id = required("API_CLIENT_ID")?;
		let secret = SecretString::new(required("API_SECRET")?);
		let product = ProductType::from(required("API_PRODUCT_TYPE")?.trim().to_owned());

		product.path_segment()?;

		let issuance = IssuanceMode::from_flag(lookup("IS_ORDER").as_deref());
		let base_url = match lookup("API_BASE_URL").filter(|value| !value.trim().is_empty()) {
			Some(raw) => Url::parse(raw.trim()).map_err(ConfigError::from)?,
			None => Url::parse(Self::DEFAULT_BASE_URL).map_err(ConfigError::from)?,
		};

		Ok(Self { client_id, secret, product, issuance, base_url })
	}

	/// Builds a webhook verifier keyed with the API secret.
	pub fn webhook_verifier(&self) -> WebhookVerifier {
		WebhookVerifier::new(self.secret.clone())
	}
}

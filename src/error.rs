//! Broker-level error types shared across flows, sessions, the provider client, and webhooks.

// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, TaskId},
	provider::ProviderOperation,
};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// An operation that needs an access token ran before one was established.
	#[error("No access token available. Please complete verification first.")]
	NoActiveSession,
	/// Provider rejected the link token exchange.
	#[error("Provider rejected the token exchange: {reason}.")]
	Auth {
		/// Provider- or broker-supplied reason string.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// A downstream provider call failed.
	#[error("Provider request `{operation}` failed.")]
	ProviderRequestFailed {
		/// Provider operation that failed.
		operation: ProviderOperation,
		/// Classified failure.
		#[source]
		source: RequestFailure,
	},
	/// Webhook verification ran without a configured shared secret.
	#[error("Webhook shared secret is not configured.")]
	MissingSecret,
	/// Webhook signature did not match the payload.
	#[error("Webhook signature does not match the payload.")]
	InvalidSignature,
	/// Refresh job never reached a terminal status within the poll policy bounds.
	#[error("Refresh task {task_id} did not finish after {polls} status checks.")]
	RefreshTimedOut {
		/// Provider task identifier.
		task_id: TaskId,
		/// Status checks performed before giving up.
		polls: u32,
	},
	/// Caller cancelled the refresh while it was polling.
	#[error("Refresh task {task_id} was cancelled.")]
	RefreshCancelled {
		/// Provider task identifier.
		task_id: TaskId,
	},
}
impl Error {
	/// Builds a [`Error::ProviderRequestFailed`] for the given operation.
	pub fn provider(operation: ProviderOperation, source: RequestFailure) -> Self {
		Self::ProviderRequestFailed { operation, source }
	}
}

/// Configuration and validation failures raised by the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Required environment variable is missing or empty.
	#[error("Environment variable `{name}` is not set.")]
	MissingVariable {
		/// Variable name.
		name: &'static str,
	},
	/// Provider base URL cannot be parsed or joined.
	#[error("Provider URL is invalid.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Provider base URL cannot carry path segments.
	#[error("Provider base URL `{url}` cannot be used as a base.")]
	CannotBeABase {
		/// Offending URL.
		url: String,
	},
	/// Webhook secret was rejected by the HMAC implementation.
	#[error("Webhook secret cannot be used as an HMAC key.")]
	InvalidWebhookSecret,
	/// An identifier failed validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] IdentifierError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<url::ParseError> for ConfigError {
	fn from(source: url::ParseError) -> Self {
		Self::InvalidUrl { source }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
impl From<IdentifierError> for Error {
	fn from(e: IdentifierError) -> Self {
		Self::Config(e.into())
	}
}

/// Classified failure of a single provider request.
#[derive(Debug, ThisError)]
pub enum RequestFailure {
	/// Provider answered with a non-success HTTP status.
	#[error("Provider returned HTTP {status}: {body_preview}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body_preview: String,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Provider responded with JSON that does not match the expected shape.
	#[error("Provider returned malformed JSON.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl RequestFailure {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Builds a status failure, truncating the body to a bounded preview.
	pub fn status(status: u16, body: &[u8]) -> Self {
		let text = String::from_utf8_lossy(body);
		let body_preview = match text.char_indices().nth(Self::BODY_PREVIEW_LIMIT) {
			Some((idx, _)) => format!("{}...", &text[..idx]),
			None => text.into_owned(),
		};

		Self::Status { status, body_preview }
	}

	/// HTTP status code carried by the failure, when available.
	pub fn http_status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			_ => None,
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for RequestFailure {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

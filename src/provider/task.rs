//! Refresh job model and its status machine.

// self
use crate::{_prelude::*, auth::TaskId};

/// Status reported by the provider for a refresh job.
///
/// The eight terminal values are closed variants; everything else the provider may
/// report while a job is in flight (`new`, `queued`, `parse`, ...) is kept verbatim
/// in [`RefreshStatus::Pending`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RefreshStatus {
	/// Job finished and fresh data is available.
	Done,
	/// Provider could not log in with the stored credentials.
	LoginError,
	/// Multi-factor authentication failed or timed out.
	MfaError,
	/// Provider-side configuration problem.
	ConfigError,
	/// Payroll account is locked.
	AccountLocked,
	/// Account returned no data.
	NoData,
	/// Payroll provider is unavailable.
	Unavailable,
	/// Unclassified provider failure.
	Error,
	/// Non-terminal status; the job is still running.
	Pending(String),
}
impl RefreshStatus {
	/// Wire names of every terminal status.
	pub const TERMINAL: [&'static str; 8] = [
		"done",
		"login_error",
		"mfa_error",
		"config_error",
		"account_locked",
		"no_data",
		"unavailable",
		"error",
	];

	/// Returns the provider's wire name for the status.
	pub fn as_str(&self) -> &str {
		match self {
			RefreshStatus::Done => "done",
			RefreshStatus::LoginError => "login_error",
			RefreshStatus::MfaError => "mfa_error",
			RefreshStatus::ConfigError => "config_error",
			RefreshStatus::AccountLocked => "account_locked",
			RefreshStatus::NoData => "no_data",
			RefreshStatus::Unavailable => "unavailable",
			RefreshStatus::Error => "error",
			RefreshStatus::Pending(raw) => raw,
		}
	}

	/// Returns `true` once the job will not progress further.
	pub fn is_terminal(&self) -> bool {
		!matches!(self, RefreshStatus::Pending(_))
	}

	/// Returns `true` only for the successful terminal status.
	pub fn is_success(&self) -> bool {
		matches!(self, RefreshStatus::Done)
	}
}
impl Default for RefreshStatus {
	fn default() -> Self {
		RefreshStatus::Pending("new".into())
	}
}
impl Display for RefreshStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl From<&str> for RefreshStatus {
	fn from(value: &str) -> Self {
		match value {
			"done" => RefreshStatus::Done,
			"login_error" => RefreshStatus::LoginError,
			"mfa_error" => RefreshStatus::MfaError,
			"config_error" => RefreshStatus::ConfigError,
			"account_locked" => RefreshStatus::AccountLocked,
			"no_data" => RefreshStatus::NoData,
			"unavailable" => RefreshStatus::Unavailable,
			"error" => RefreshStatus::Error,
			other => RefreshStatus::Pending(other.to_owned()),
		}
	}
}
impl From<String> for RefreshStatus {
	fn from(value: String) -> Self {
		Self::from(value.as_str())
	}
}
impl From<RefreshStatus> for String {
	fn from(value: RefreshStatus) -> Self {
		match value {
			RefreshStatus::Pending(raw) => raw,
			terminal => terminal.as_str().to_owned(),
		}
	}
}

/// Provider-side refresh job snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTask {
	/// Job identifier used for status polling.
	pub task_id: TaskId,
	/// Latest status; creation responses may omit it.
	#[serde(default)]
	pub status: RefreshStatus,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn terminal_set_matches_wire_names() {
		for raw in RefreshStatus::TERMINAL {
			let status = RefreshStatus::from(raw);

			assert!(status.is_terminal(), "{raw} should be terminal.");
			assert_eq!(status.as_str(), raw);
		}

		assert!(RefreshStatus::from("done").is_success());
		assert!(!RefreshStatus::from("login_error").is_success());
	}

	#[test]
	fn in_flight_statuses_are_pending() {
		for raw in ["new", "queued", "parse", "DONE", ""] {
			assert!(!RefreshStatus::from(raw).is_terminal(), "{raw:?} should not be terminal.");
		}
	}

	#[test]
	fn creation_response_without_status_defaults_to_pending() {
		let task: RefreshTask = serde_json::from_str(r#"{"task_id":"task-1"}"#)
			.expect("Creation payload should deserialize.");

		assert_eq!(task.task_id.as_ref(), "task-1");
		assert!(!task.status.is_terminal());

		let polled: RefreshTask =
			serde_json::from_str(r#"{"task_id":"task-1","status":"account_locked"}"#)
				.expect("Status payload should deserialize.");

		assert_eq!(polled.status, RefreshStatus::AccountLocked);
	}
}

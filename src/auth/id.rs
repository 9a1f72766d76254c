//! Strongly typed identifiers for sessions and provider-issued resources.
//!
//! Provider identifiers are interpolated into request paths, so path separators are
//! rejected alongside whitespace.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (session, link, task, report, user, product).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (session, link, task, report, user, product).
		kind: &'static str,
	},
	/// The identifier contains a URL path separator.
	#[error("{kind} identifier contains a path separator.")]
	ContainsSeparator {
		/// Kind of identifier (session, link, task, report, user, product).
		kind: &'static str,
	},
	/// The identifier is a `.` or `..` path segment.
	#[error("{kind} identifier cannot be a dot segment.")]
	DotSegment {
		/// Kind of identifier (session, link, task, report, user, product).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (session, link, task, report, user, product).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { SessionId, "Caller-chosen identifier for one verification session.", "Session" }
def_id! { LinkId, "Provider identifier for a linked payroll account.", "Link" }
def_id! { TaskId, "Provider identifier for an asynchronous refresh job.", "Task" }
def_id! { ReportId, "Provider identifier for a requested payroll report.", "Report" }
def_id! { UserId, "Provider identifier for a user created during bridge token issuance.", "User" }

/// Checks that `view` can be used as a single URL path segment.
pub(crate) fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.contains(['/', '\\']) {
		return Err(IdentifierError::ContainsSeparator { kind });
	}
	if matches!(view, "." | "..") {
		return Err(IdentifierError::DotSegment { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_whitespace_and_empty_values() {
		assert!(SessionId::new(" session-1").is_err(), "Leading whitespace must be rejected.");
		assert!(SessionId::new("session-1 ").is_err(), "Trailing whitespace must be rejected.");

		let session =
			SessionId::new("session-1").expect("Session fixture should be considered valid.");

		assert_eq!(session.as_ref(), "session-1");
		assert!(LinkId::new("").is_err());
		assert!(TaskId::new("with space").is_err());
	}

	#[test]
	fn path_separators_are_rejected() {
		assert_eq!(
			LinkId::new("../admin").expect_err("Path traversal must be rejected."),
			IdentifierError::ContainsSeparator { kind: "Link" },
		);
		assert!(ReportId::new("a\\b").is_err());
		assert_eq!(
			TaskId::new("..").expect_err("Dot segments must be rejected."),
			IdentifierError::DotSegment { kind: "Task" },
		);
		assert!(TaskId::new("..task").is_ok());
	}

	#[test]
	fn serde_enforces_validation() {
		let task: TaskId =
			serde_json::from_str("\"48427a36d43c4d5aa6324bc06c692456\"")
				.expect("Task identifier should deserialize successfully.");

		assert_eq!(task.as_ref(), "48427a36d43c4d5aa6324bc06c692456");
		assert!(serde_json::from_str::<TaskId>("\"with space\"").is_err());
		assert!(serde_json::from_str::<LinkId>("\"\"").is_err());
	}

	#[test]
	fn length_limit_is_inclusive() {
		let exact = "a".repeat(IDENTIFIER_MAX_LEN);

		UserId::new(&exact).expect("Exact length should succeed.");

		let too_long = "a".repeat(IDENTIFIER_MAX_LEN + 1);

		assert!(UserId::new(&too_long).is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<SessionId, u8> = HashMap::from_iter([(
			SessionId::new("session-123").expect("Session used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("session-123"), Some(&7));
	}
}

//! Thread-safe in-memory session state keyed by [`SessionId`].
//!
//! Each verification session owns at most one current [`AccessTokenResponse`]. A new
//! exchange overwrites the previous response for that session only, so concurrent
//! sessions never observe each other's tokens. Nothing is persisted.

// self
use crate::{
	_prelude::*,
	auth::{AccessTokenResponse, SessionId},
};

type SessionMap = Arc<RwLock<HashMap<SessionId, AccessTokenResponse>>>;

/// Process-local holder of the current access token per session.
#[derive(Clone, Debug, Default)]
pub struct SessionStore(SessionMap);
impl SessionStore {
	/// Stores `response` as the session's current token, replacing any previous one.
	pub fn set_current(&self, session: &SessionId, response: AccessTokenResponse) {
		self.0.write().insert(session.clone(), response);
	}

	/// Returns the session's current token.
	pub fn current(&self, session: &SessionId) -> Result<AccessTokenResponse> {
		self.0.read().get(session).cloned().ok_or(Error::NoActiveSession)
	}

	/// Forgets the session, returning the token it held.
	pub fn clear(&self, session: &SessionId) -> Option<AccessTokenResponse> {
		self.0.write().remove(session)
	}

	/// Number of sessions currently holding a token.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no session holds a token.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}

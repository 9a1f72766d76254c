//! Poll loop bounds and cooperative cancellation.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio_util::sync::CancellationToken;

/// Interval and bounds for the refresh status poll loop.
///
/// The default polls every two seconds without any bound, so a job that never settles
/// keeps the loop alive until the caller cancels it. Set [`max_polls`](Self::max_polls)
/// or [`deadline`](Self::deadline) to turn a stuck job into
/// [`Error::RefreshTimedOut`](crate::error::Error::RefreshTimedOut).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
	/// Fixed wait between consecutive status checks.
	pub interval: StdDuration,
	/// Maximum number of status checks, including the first one.
	pub max_polls: Option<u32>,
	/// Wall-clock budget measured from the first status check.
	pub deadline: Option<StdDuration>,
}
impl PollPolicy {
	/// Wait between status checks when nothing else is configured.
	pub const DEFAULT_INTERVAL: StdDuration = StdDuration::from_millis(2_000);

	/// Unbounded policy with the given interval.
	pub fn every(interval: StdDuration) -> Self {
		Self { interval, max_polls: None, deadline: None }
	}

	/// Caps the number of status checks; values below one are raised to one.
	pub fn with_max_polls(mut self, max_polls: u32) -> Self {
		self.max_polls = Some(max_polls.max(1));

		self
	}

	/// Caps the total time spent polling.
	pub fn with_deadline(mut self, deadline: StdDuration) -> Self {
		self.deadline = Some(deadline);

		self
	}

	/// Returns `true` when another wait + status check would exceed a bound.
	///
	/// `polls` is the number of status checks performed so far and `elapsed` the time
	/// since the first one.
	pub fn exhausted(&self, polls: u32, elapsed: StdDuration) -> bool {
		if self.max_polls.is_some_and(|max| polls >= max) {
			return true;
		}

		self.deadline.is_some_and(|deadline| elapsed.saturating_add(self.interval) > deadline)
	}
}
impl Default for PollPolicy {
	fn default() -> Self {
		Self::every(Self::DEFAULT_INTERVAL)
	}
}

/// Cloneable cancellation signal observed by the poll wait.
///
/// Cancelling wakes every waiter immediately; a refresh cancelled before it starts
/// waiting stops at its first wait without sleeping.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(CancellationToken);
impl CancelToken {
	/// Creates a token that is not cancelled.
	pub fn new() -> Self {
		Self::default()
	}

	/// Cancels every operation observing this token.
	pub fn cancel(&self) {
		self.0.cancel();
	}

	/// Returns `true` once [`cancel`](Self::cancel) has been called.
	pub fn is_cancelled(&self) -> bool {
		self.0.is_cancelled()
	}

	/// Resolves once the token is cancelled.
	pub async fn cancelled(&self) {
		self.0.cancelled().await
	}

	/// Sleeps for `interval`; returns `false` if cancelled first.
	pub(crate) async fn sleep(&self, interval: StdDuration) -> bool {
		tokio::select! {
			biased;
			_ = self.0.cancelled() => false,
			_ = tokio::time::sleep(interval) => true,
		}
	}
}
impl From<CancellationToken> for CancelToken {
	fn from(token: CancellationToken) -> Self {
		Self(token)
	}
}

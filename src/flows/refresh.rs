//! Refresh job orchestration: create, poll until terminal, then dispatch on product type.
//!
//! [`Broker::refresh_and_fetch`] resolves the session's access token and hands it to
//! [`Broker::run_refresh`], which asks the provider to create a refresh job and polls its
//! status at a fixed interval. The loop leaves on the first terminal status and never
//! re-fetches afterwards. Every terminal status, successful or not, proceeds to the
//! product dispatch: employment and income fetch the link report, admin assembles the
//! directory and payroll report, and anything else yields the soft-error payload. The
//! terminal status travels with the report so callers can tell `done` apart from
//! `login_error` and friends.
//!
//! The loop is bounded by the broker's [`PollPolicy`] and observes a [`CancelToken`]
//! during every wait.

mod metrics;
mod poll;

pub use metrics::RefreshMetrics;
pub use poll::{CancelToken, PollPolicy};

// crates.io
use tokio::time::Instant;
// self
use crate::{
	_prelude::*,
	auth::{AccessTokenResponse, SessionId, TaskId},
	flows::{Broker, ReportPayload, common},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{ProductType, ProviderClient, RefreshStatus},
};

/// Outcome of a completed refresh.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RefreshReport {
	/// Provider job identifier.
	pub task_id: TaskId,
	/// Terminal status the job settled into.
	pub status: RefreshStatus,
	/// Status checks issued, including the terminal one.
	pub polls: u32,
	/// Report assembled after the job settled.
	pub payload: ReportPayload,
}
impl RefreshReport {
	/// Returns `true` when the job finished with `done`.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}
}

impl<C> Broker<C>
where
	C: ?Sized + ProviderClient,
{
	/// Refreshes the session's data with the deployment's product type.
	///
	/// Fails with [`Error::NoActiveSession`] before any provider call when the session
	/// holds no token.
	pub async fn refresh_and_fetch(
		&self,
		session: &SessionId,
		cancel: &CancelToken,
	) -> Result<RefreshReport> {
		let token = self.sessions.current(session)?;

		self.run_refresh(&token, &self.product, cancel).await
	}

	/// Drives one refresh job from creation to a terminal status, then dispatches on
	/// `product`.
	pub async fn run_refresh(
		&self,
		token: &AccessTokenResponse,
		product: &ProductType,
		cancel: &CancelToken,
	) -> Result<RefreshReport> {
		const KIND: FlowKind = FlowKind::Refresh;

		if !token.has_access_token() {
			return Err(Error::NoActiveSession);
		}

		let span = FlowSpan::new(KIND, "run_refresh");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let result = span
			.instrument(async move {
				let task = self.provider.create_refresh_job(&token.access_token).await?;
				let (status, polls) = self.poll_until_terminal(&task.task_id, cancel).await?;
				let payload =
					common::product_report(self.provider.as_ref(), token, product, self.payroll_window)
						.await?;

				Ok(RefreshReport { task_id: task.task_id, status, polls, payload })
			})
			.await;

		match &result {
			Ok(_) => {
				self.refresh_metrics.record_success();
				obs::record_flow_outcome(KIND, FlowOutcome::Success);
			},
			Err(_) => {
				self.refresh_metrics.record_failure();
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
			},
		}

		result
	}

	async fn poll_until_terminal(
		&self,
		task_id: &TaskId,
		cancel: &CancelToken,
	) -> Result<(RefreshStatus, u32)> {
		let policy = self.poll_policy;
		let started = Instant::now();
		let mut status = self.fetch_status(task_id).await?;
		let mut polls = 1_u32;

		while !status.is_terminal() {
			if policy.exhausted(polls, started.elapsed()) {
				return Err(Error::RefreshTimedOut { task_id: task_id.clone(), polls });
			}

			obs::log_refresh_pending(task_id, &status, polls, policy.interval);

			if !cancel.sleep(policy.interval).await {
				return Err(Error::RefreshCancelled { task_id: task_id.clone() });
			}

			status = self.fetch_status(task_id).await?;
			polls = polls.saturating_add(1);
		}

		obs::log_refresh_terminal(task_id, &status, polls);

		Ok((status, polls))
	}

	async fn fetch_status(&self, task_id: &TaskId) -> Result<RefreshStatus> {
		self.refresh_metrics.record_poll();
		obs::record_refresh_poll();

		Ok(self.provider.get_refresh_job_status(task_id).await?.status)
	}
}

//! Optional observability helpers for broker flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit structured spans named
//!   `verification_broker.flow` with the `flow` and `stage` fields, plus events for
//!   provider requests, refresh poll iterations, terminal transitions, and webhook checks.
//! - Enable `metrics` to increment the `verification_broker_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`, and the
//!   `verification_broker_refresh_polls_total` counter for every status check.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Broker flow kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Link token exchange and session establishment.
	Exchange,
	/// Refresh job orchestration.
	Refresh,
	/// Administrator directory + payroll retrieval.
	Admin,
	/// Bridge token issuance.
	BridgeToken,
	/// Webhook signature verification.
	Webhook,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Exchange => "exchange",
			FlowKind::Refresh => "refresh",
			FlowKind::Admin => "admin",
			FlowKind::BridgeToken => "bridge_token",
			FlowKind::Webhook => "webhook",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a broker helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

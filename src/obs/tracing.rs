// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::TaskId,
	obs::FlowKind,
	provider::{ProviderOperation, RefreshStatus},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by broker flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("verification_broker.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> FlowSpanGuard {
		#[cfg(feature = "tracing")]
		{
			FlowSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			FlowSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// RAII guard returned by [`FlowSpan::entered`].
pub struct FlowSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for FlowSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FlowSpanGuard(..)")
	}
}

/// Emits a debug event before a provider request is dispatched.
pub fn log_provider_request(operation: ProviderOperation, path: &str) {
	#[cfg(feature = "tracing")]
	tracing::debug!(operation = operation.as_str(), path, "Calling provider.");
	#[cfg(not(feature = "tracing"))]
	let _ = (operation, path);
}

/// Emits a progress event for a refresh job that is still running.
pub fn log_refresh_pending(task_id: &TaskId, status: &RefreshStatus, poll: u32, wait: StdDuration) {
	#[cfg(feature = "tracing")]
	tracing::info!(
		%task_id,
		status = status.as_str(),
		poll,
		wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
		"Refresh task is not finished; waiting before checking again."
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (task_id, status, poll, wait);
}

/// Emits the terminal transition of a refresh job.
pub fn log_refresh_terminal(task_id: &TaskId, status: &RefreshStatus, polls: u32) {
	#[cfg(feature = "tracing")]
	{
		if status.is_success() {
			tracing::info!(
				%task_id,
				status = status.as_str(),
				polls,
				"Refresh task is finished; pulling the latest data."
			);
		} else {
			tracing::warn!(
				%task_id,
				status = status.as_str(),
				polls,
				"Refresh task finished without fresh data; pulling the latest data anyway."
			);
		}
	}
	#[cfg(not(feature = "tracing"))]
	let _ = (task_id, status, polls);
}

/// Emits the outcome of an inbound webhook check.
pub fn log_webhook(event_type: Option<&str>, status: Option<&str>, signature_match: bool) {
	#[cfg(feature = "tracing")]
	tracing::info!(event_type, status, signature_match, "Webhook received.");
	#[cfg(not(feature = "tracing"))]
	let _ = (event_type, status, signature_match);
}

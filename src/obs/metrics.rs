// self
use crate::obs::{FlowKind, FlowOutcome};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"verification_broker_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records one refresh job status check (when enabled).
pub fn record_refresh_poll() {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("verification_broker_refresh_polls_total").increment(1);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_metrics() {
		record_flow_outcome(FlowKind::Refresh, FlowOutcome::Failure);
		record_refresh_poll();
	}
}

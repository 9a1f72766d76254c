//! High-level flow orchestrators powered by the broker facade.

pub mod common;
pub mod refresh;

mod verification;

pub use common::*;
pub use refresh::*;

// self
use crate::{
	_prelude::*,
	config::IssuanceMode,
	provider::{ProductType, ProviderClient},
	session::SessionStore,
};
#[cfg(feature = "reqwest")]
use crate::{config::BrokerConfig, http::ReqwestProviderClient};

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport.
pub type ReqwestBroker = Broker<ReqwestProviderClient>;

/// Coordinates verification sessions against a single provider deployment.
///
/// The broker owns the provider client, the session store, and the deployment's
/// product type so individual flows can focus on their own sequencing (exchange,
/// refresh polling, admin report assembly, bridge token issuance). Session state is
/// always addressed by an explicit [`SessionId`](crate::auth::SessionId), so a second
/// exchange for one session never disturbs a refresh running for another.
#[derive(Clone)]
pub struct Broker<C>
where
	C: ?Sized + ProviderClient,
{
	/// Provider client used for every outbound request.
	pub provider: Arc<C>,
	/// Current access token per verification session.
	pub sessions: SessionStore,
	/// Product selecting the refresh dispatch branch.
	pub product: ProductType,
	/// Bridge token issuance mode.
	pub issuance: IssuanceMode,
	/// Bounds and interval of the refresh poll loop.
	pub poll_policy: PollPolicy,
	/// Date window used for administrator payroll reports.
	pub payroll_window: PayrollWindow,
	/// Shared metrics recorder for refresh flow outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
}
impl<C> Broker<C>
where
	C: ?Sized + ProviderClient,
{
	/// Creates a broker around the caller-provided provider client.
	pub fn with_provider(provider: impl Into<Arc<C>>, product: ProductType) -> Self {
		Self {
			provider: provider.into(),
			sessions: Default::default(),
			product,
			issuance: Default::default(),
			poll_policy: Default::default(),
			payroll_window: Default::default(),
			refresh_metrics: Default::default(),
		}
	}

	/// Shares an existing session store.
	pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
		self.sessions = sessions;

		self
	}

	/// Overrides the bridge token issuance mode.
	pub fn with_issuance(mut self, issuance: IssuanceMode) -> Self {
		self.issuance = issuance;

		self
	}

	/// Overrides the refresh poll policy.
	pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
		self.poll_policy = policy;

		self
	}

	/// Overrides the administrator payroll window.
	pub fn with_payroll_window(mut self, window: PayrollWindow) -> Self {
		self.payroll_window = window;

		self
	}
}
#[cfg(feature = "reqwest")]
impl Broker<ReqwestProviderClient> {
	/// Creates a reqwest-backed broker from the deployment configuration.
	pub fn from_config(config: &BrokerConfig) -> Result<Self> {
		let provider = ReqwestProviderClient::from_config(config)?;

		Ok(Self::with_provider(provider, config.product.clone()).with_issuance(config.issuance))
	}
}
impl<C> Debug for Broker<C>
where
	C: ?Sized + ProviderClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("product", &self.product)
			.field("issuance", &self.issuance)
			.field("poll_policy", &self.poll_policy)
			.field("payroll_window", &self.payroll_window)
			.field("sessions", &self.sessions.len())
			.finish()
	}
}

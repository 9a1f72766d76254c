//! Session establishment, direct report retrieval, bridge token issuance, and webhook checks.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{AccessTokenResponse, SessionId},
	config::IssuanceMode,
	flows::{Broker, ReportPayload, common},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{OrderRequest, ProductType, ProviderClient, UserProfile},
	webhook,
};

impl<C> Broker<C>
where
	C: ?Sized + ProviderClient,
{
	/// Issues a bridge token for a new verification session.
	///
	/// In [`IssuanceMode::Order`] the provider creates an order carrying the token;
	/// otherwise a sandbox user is created first and the token is minted for that user.
	pub async fn issue_bridge_token(&self) -> Result<Value> {
		const KIND: FlowKind = FlowKind::BridgeToken;

		let span = FlowSpan::new(KIND, "issue_bridge_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				match self.issuance {
					IssuanceMode::Order => {
						let order = OrderRequest::sandbox(self.product.clone());

						self.provider.create_order(&order).await
					},
					IssuanceMode::User => {
						let user = self.provider.create_user(&UserProfile::sandbox()).await?;

						self.provider.create_user_bridge_token(&user.id, &self.product).await
					},
				}
			})
			.await;

		record(KIND, &result);

		result
	}

	/// Exchanges the link token and stores the result as the session's current token.
	pub async fn begin_verification(
		&self,
		session: &SessionId,
		link_token: &str,
	) -> Result<AccessTokenResponse> {
		const KIND: FlowKind = FlowKind::Exchange;

		let span = FlowSpan::new(KIND, "begin_verification");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.exchange(link_token)).await;

		if let Ok(response) = &result {
			self.sessions.set_current(session, response.clone());
		}

		record(KIND, &result);

		result
	}

	/// Fetches the link report for the session's link and the deployment's product type.
	pub async fn verifications(&self, session: &SessionId) -> Result<Value> {
		let token = self.sessions.current(session)?;

		self.provider.get_link_report(&token.link_id, &self.product).await
	}

	/// Exchanges the link token and fetches the link report for an explicit product,
	/// e.g. `direct_deposit` or `pll`, without touching session state.
	pub async fn exchange_and_fetch(&self, link_token: &str, product: &ProductType) -> Result<Value> {
		const KIND: FlowKind = FlowKind::Exchange;

		let span = FlowSpan::new(KIND, "exchange_and_fetch");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let response = self.exchange(link_token).await?;

				self.provider.get_link_report(&response.link_id, product).await
			})
			.await;

		record(KIND, &result);

		result
	}

	/// Exchanges the link token, stores it for the session, and assembles the
	/// administrator directory + payroll report.
	pub async fn admin_data(&self, session: &SessionId, link_token: &str) -> Result<ReportPayload> {
		const KIND: FlowKind = FlowKind::Admin;

		let span = FlowSpan::new(KIND, "admin_data");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let response = self.exchange(link_token).await?;

				self.sessions.set_current(session, response.clone());

				common::admin_report(self.provider.as_ref(), &response.access_token, self.payroll_window)
					.await
			})
			.await;

		record(KIND, &result);

		result
	}

	/// Verifies a webhook signature over the raw body; see [`webhook::verify`].
	pub fn verify_webhook(&self, raw_body: &[u8], signature: &str, secret: &[u8]) -> Result<bool> {
		webhook::verify(raw_body, signature, secret)
	}

	async fn exchange(&self, link_token: &str) -> Result<AccessTokenResponse> {
		let response = self.provider.exchange_token(link_token).await?;

		if response.has_access_token() {
			Ok(response)
		} else {
			Err(Error::Auth { reason: "Failed to obtain access token".into(), status: None })
		}
	}
}

fn record<T>(kind: FlowKind, result: &Result<T>) {
	match result {
		Ok(_) => obs::record_flow_outcome(kind, FlowOutcome::Success),
		Err(_) => obs::record_flow_outcome(kind, FlowOutcome::Failure),
	}
}

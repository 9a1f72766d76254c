mod common;

// crates.io
use serde_json::json;
// self
use common::*;
use verification_broker::{
	config::IssuanceMode,
	error::Error,
	flows::ReportPayload,
	provider::ProductType,
	webhook::{WebhookVerifier, compute_signature},
};

#[tokio::test]
async fn begin_verification_stores_the_exchanged_token_for_the_session() {
	let provider = ScriptedProvider::default();
	let broker = broker(&provider, ProductType::Employment);
	let id = session("s-1");
	let response =
		broker.begin_verification(&id, "public-1").await.expect("Exchange should succeed.");

	assert_eq!(response.access_token.expose(), ACCESS_TOKEN);
	assert_eq!(broker.sessions.current(&id).expect("Session should hold the token."), response);
	assert_eq!(provider.calls(), vec![Call::Exchange("public-1".into())]);
}

#[tokio::test]
async fn failed_exchange_leaves_the_session_untouched() {
	let provider = ScriptedProvider::default().exchange_returns("");
	let broker = broker(&provider, ProductType::Employment);
	let id = session("s-1");
	let err = broker
		.begin_verification(&id, "public-1")
		.await
		.expect_err("An exchange without an access token should fail.");

	assert!(matches!(err, Error::Auth { .. }));
	assert!(matches!(broker.sessions.current(&id), Err(Error::NoActiveSession)));
}

#[tokio::test]
async fn verifications_read_the_link_report_for_the_session() {
	let provider = ScriptedProvider::default();
	let broker = broker(&provider, ProductType::Income);
	let id = session("s-1");

	assert!(matches!(broker.verifications(&id).await, Err(Error::NoActiveSession)));
	assert!(provider.calls().is_empty());

	broker.sessions.set_current(&id, token());

	let report = broker.verifications(&id).await.expect("Report should be fetched.");

	assert_eq!(report, json!({ "link_id": LINK_ID, "product": "income" }));
}

#[tokio::test]
async fn exchange_and_fetch_uses_the_explicit_product_without_storing() {
	let provider = ScriptedProvider::default();
	let broker = broker(&provider, ProductType::Employment);
	let report = broker
		.exchange_and_fetch("public-1", &ProductType::Pll)
		.await
		.expect("Direct retrieval should succeed.");

	assert_eq!(report, json!({ "link_id": LINK_ID, "product": "pll" }));
	assert_eq!(
		provider.calls(),
		vec![Call::Exchange("public-1".into()), Call::LinkReport(LINK_ID.into(), "pll".into())]
	);
	assert!(broker.sessions.is_empty());
}

#[tokio::test]
async fn admin_data_exchanges_stores_and_assembles_the_report() {
	let provider = ScriptedProvider::default();
	let broker = broker(&provider, ProductType::Admin);
	let id = session("s-admin");
	let payload = broker.admin_data(&id, "public-1").await.expect("Admin data should be built.");

	assert!(matches!(payload, ReportPayload::Admin { .. }));
	assert!(broker.sessions.current(&id).is_ok());
	assert_eq!(
		provider.calls(),
		vec![
			Call::Exchange("public-1".into()),
			Call::Directory(ACCESS_TOKEN.into()),
			Call::RequestPayroll {
				access_token: ACCESS_TOKEN.into(),
				start: "2020-01-01".into(),
				end: "2020-02-01".into(),
			},
			Call::Payroll("report-1".into()),
		]
	);
}

#[tokio::test]
async fn user_mode_creates_a_user_before_issuing_the_bridge_token() {
	let provider = ScriptedProvider::default();
	let broker = broker(&provider, ProductType::Income);
	let token = broker.issue_bridge_token().await.expect("Bridge token should be issued.");

	assert_eq!(token["bridge_token"], "bridge-user");
	assert_eq!(
		provider.calls(),
		vec![Call::CreateUser, Call::BridgeToken("user-1".into(), "income".into())]
	);
}

#[tokio::test]
async fn order_mode_issues_the_bridge_token_through_an_order() {
	let provider = ScriptedProvider::default();
	let broker = broker(&provider, ProductType::Employment).with_issuance(IssuanceMode::Order);
	let token = broker.issue_bridge_token().await.expect("Order should be created.");

	assert_eq!(token["bridge_token"], "bridge-order");
	assert_eq!(provider.calls(), vec![Call::CreateOrder(vec!["employment".into()])]);
}

#[test]
fn webhook_signed_by_the_provider_verifies_and_tampering_fails() {
	let provider = ScriptedProvider::default();
	let broker = broker(&provider, ProductType::Employment);
	let body = br#"{"event_type":"task-status-updated","status":"done"}"#;
	let signature = compute_signature(body, b"s").expect("Signing should succeed.");

	assert!(broker.verify_webhook(body, &signature, b"s").expect("Verification should run."));
	assert!(!broker.verify_webhook(body, &signature, b"t").expect("Verification should run."));
	assert!(matches!(broker.verify_webhook(body, &signature, b""), Err(Error::MissingSecret)));

	let verifier = WebhookVerifier::new("s");
	let summary =
		verifier.authenticate(body, Some(&signature)).expect("Signed webhook should pass.");

	assert_eq!(summary.event_type.as_deref(), Some("task-status-updated"));
	assert_eq!(summary.status.as_deref(), Some("done"));
	assert!(matches!(verifier.authenticate(body, None), Err(Error::InvalidSignature)));

	let inspection = verifier.inspect(body, Some("v1=00")).expect("Inspection never rejects.");

	assert!(!inspection.signature_match);
}

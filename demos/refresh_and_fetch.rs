//! Demonstrates a full verification round trip against a mock provider: exchange a link
//! token for a session, refresh the payroll data, and read the employment report.

// std
use std::time::Duration;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use verification_broker::{
	auth::SessionId,
	flows::{CancelToken, PollPolicy, ReqwestBroker},
	http::ReqwestProviderClient,
	provider::ProductType,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let exchange_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/link-access-tokens/");
			then.status(200).json_body(json!({ "access_token": "demo-access", "link_id": "demo-link" }));
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/refresh/tasks/");
			then.status(200).json_body(json!({ "task_id": "demo-task", "status": "new" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/refresh/tasks/demo-task/");
			then.status(200).json_body(json!({ "task_id": "demo-task", "status": "done" }));
		})
		.await;

	let report_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/links/demo-link/employment/report");
			then.status(200).json_body(json!({ "employments": [{ "company": "Acme" }] }));
		})
		.await;
	let provider =
		ReqwestProviderClient::new(Url::parse(&server.url("/v1"))?, "demo-client", "demo-secret")?;
	let broker = ReqwestBroker::with_provider(provider, ProductType::Employment)
		.with_poll_policy(PollPolicy::every(Duration::from_millis(250)).with_max_polls(20));
	let session = SessionId::new("demo-session")?;

	broker.begin_verification(&session, "demo-public-token").await?;

	let report = broker.refresh_and_fetch(&session, &CancelToken::new()).await?;

	println!(
		"Refresh {} settled as {} after {} poll(s): {}.",
		report.task_id,
		report.status,
		report.polls,
		serde_json::to_string(&report.payload)?
	);

	exchange_mock.assert_async().await;
	report_mock.assert_async().await;

	Ok(())
}

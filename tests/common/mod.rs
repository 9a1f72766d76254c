//! Scripted in-process provider shared by the flow integration tests.

#![allow(dead_code)]

// std
use std::{collections::VecDeque, sync::Arc};
// crates.io
use parking_lot::Mutex;
use serde_json::{Value, json};
use time::Date;
use tokio::time::Instant;
// self
use verification_broker::{
	auth::{AccessTokenResponse, LinkId, ReportId, SecretString, SessionId, TaskId, UserId},
	error::{Error, RequestFailure, Result},
	flows::{Broker, PollPolicy},
	provider::{
		OrderRequest, PayrollReportRequest, ProductType, ProviderClient, ProviderFuture,
		ProviderOperation, RefreshStatus, RefreshTask, UserProfile, UserResponse,
	},
};

pub const TASK_ID: &str = "task-1";
pub const LINK_ID: &str = "link-1";
pub const ACCESS_TOKEN: &str = "access-1";

/// Provider call as observed by [`ScriptedProvider`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
	Exchange(String),
	CreateRefreshJob(String),
	Status(String),
	LinkReport(String, String),
	Directory(String),
	RequestPayroll { access_token: String, start: String, end: String },
	Payroll(String),
	CreateUser,
	BridgeToken(String, String),
	CreateOrder(Vec<String>),
}

#[derive(Default)]
struct Script {
	statuses: VecDeque<&'static str>,
	calls: Vec<(Call, Instant)>,
	fail_status_at: Option<usize>,
	exchange_access_token: Option<String>,
}

/// Provider double that replays a status sequence and records every call.
#[derive(Clone, Default)]
pub struct ScriptedProvider(Arc<Mutex<Script>>);
impl ScriptedProvider {
	/// Replays `statuses` in order; the last one repeats once the script runs out.
	pub fn with_statuses(statuses: &[&'static str]) -> Self {
		let provider = Self::default();

		provider.0.lock().statuses = statuses.iter().copied().collect();

		provider
	}

	/// Fails the `index`-th status check (zero-based) with a provider error.
	pub fn fail_status_at(self, index: usize) -> Self {
		self.0.lock().fail_status_at = Some(index);

		self
	}

	/// Overrides the access token returned by the exchange.
	pub fn exchange_returns(self, access_token: &str) -> Self {
		self.0.lock().exchange_access_token = Some(access_token.into());

		self
	}

	pub fn calls(&self) -> Vec<Call> {
		self.0.lock().calls.iter().map(|(call, _)| call.clone()).collect()
	}

	pub fn timed_calls(&self) -> Vec<(Call, Instant)> {
		self.0.lock().calls.clone()
	}

	pub fn status_checks(&self) -> usize {
		self.calls().iter().filter(|call| matches!(call, Call::Status(_))).count()
	}

	fn record(&self, call: Call) {
		self.0.lock().calls.push((call, Instant::now()));
	}

	fn next_status(&self) -> Result<RefreshStatus> {
		let mut script = self.0.lock();
		let index = script.calls.iter().filter(|(call, _)| matches!(call, Call::Status(_))).count();

		if script.fail_status_at == Some(index.saturating_sub(1)) {
			return Err(Error::provider(
				ProviderOperation::RefreshJobStatus,
				RequestFailure::status(503, b"unavailable"),
			));
		}

		let raw = if script.statuses.len() > 1 {
			script.statuses.pop_front().unwrap_or("queued")
		} else {
			script.statuses.front().copied().unwrap_or("queued")
		};

		Ok(RefreshStatus::from(raw))
	}
}
impl ProviderClient for ScriptedProvider {
	fn exchange_token<'a>(
		&'a self,
		link_token: &'a str,
	) -> ProviderFuture<'a, AccessTokenResponse> {
		Box::pin(async move {
			self.record(Call::Exchange(link_token.into()));

			let access =
				self.0.lock().exchange_access_token.clone().unwrap_or_else(|| ACCESS_TOKEN.into());

			Ok(AccessTokenResponse::new(access, LinkId::new(LINK_ID)?))
		})
	}

	fn create_refresh_job<'a>(
		&'a self,
		access_token: &'a SecretString,
	) -> ProviderFuture<'a, RefreshTask> {
		Box::pin(async move {
			self.record(Call::CreateRefreshJob(access_token.expose().into()));

			Ok(RefreshTask { task_id: TaskId::new(TASK_ID)?, status: RefreshStatus::default() })
		})
	}

	fn get_refresh_job_status<'a>(
		&'a self,
		task_id: &'a TaskId,
	) -> ProviderFuture<'a, RefreshTask> {
		Box::pin(async move {
			self.record(Call::Status(task_id.to_string()));

			let status = self.next_status()?;

			Ok(RefreshTask { task_id: task_id.clone(), status })
		})
	}

	fn get_link_report<'a>(
		&'a self,
		link_id: &'a LinkId,
		product: &'a ProductType,
	) -> ProviderFuture<'a, Value> {
		Box::pin(async move {
			self.record(Call::LinkReport(link_id.to_string(), product.to_string()));

			Ok(json!({ "link_id": link_id.to_string(), "product": product.as_str() }))
		})
	}

	fn get_employee_directory<'a>(
		&'a self,
		access_token: &'a SecretString,
	) -> ProviderFuture<'a, Value> {
		Box::pin(async move {
			self.record(Call::Directory(access_token.expose().into()));

			Ok(json!({ "employees": [{ "id": "employee-1" }] }))
		})
	}

	fn request_payroll_report<'a>(
		&'a self,
		access_token: &'a SecretString,
		start: Date,
		end: Date,
	) -> ProviderFuture<'a, PayrollReportRequest> {
		Box::pin(async move {
			self.record(Call::RequestPayroll {
				access_token: access_token.expose().into(),
				start: start.to_string(),
				end: end.to_string(),
			});

			Ok(PayrollReportRequest {
				payroll_report_id: ReportId::new("report-1")?,
				extra: Default::default(),
			})
		})
	}

	fn get_payroll_by_id<'a>(&'a self, report_id: &'a ReportId) -> ProviderFuture<'a, Value> {
		Box::pin(async move {
			self.record(Call::Payroll(report_id.to_string()));

			Ok(json!({ "id": report_id.to_string(), "employees": [] }))
		})
	}

	fn create_user<'a>(&'a self, _profile: &'a UserProfile) -> ProviderFuture<'a, UserResponse> {
		Box::pin(async move {
			self.record(Call::CreateUser);

			Ok(UserResponse { id: UserId::new("user-1")?, extra: Default::default() })
		})
	}

	fn create_user_bridge_token<'a>(
		&'a self,
		user_id: &'a UserId,
		product: &'a ProductType,
	) -> ProviderFuture<'a, Value> {
		Box::pin(async move {
			self.record(Call::BridgeToken(user_id.to_string(), product.to_string()));

			Ok(json!({ "bridge_token": "bridge-user" }))
		})
	}

	fn create_order<'a>(&'a self, order: &'a OrderRequest) -> ProviderFuture<'a, Value> {
		Box::pin(async move {
			self.record(Call::CreateOrder(
				order.products.iter().map(ToString::to_string).collect(),
			));

			Ok(json!({ "bridge_token": "bridge-order" }))
		})
	}
}

pub fn session(id: &str) -> SessionId {
	SessionId::new(id).expect("Session fixture should be valid.")
}

pub fn token() -> AccessTokenResponse {
	AccessTokenResponse::new(ACCESS_TOKEN, LinkId::new(LINK_ID).expect("Link fixture is valid."))
}

pub fn broker(provider: &ScriptedProvider, product: ProductType) -> Broker<ScriptedProvider> {
	Broker::with_provider(provider.clone(), product).with_poll_policy(PollPolicy::default())
}

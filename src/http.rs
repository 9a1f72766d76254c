//! Reqwest transport for the verification provider API.
//!
//! [`ReqwestProviderClient`] implements [`ProviderClient`] with JSON requests against a
//! versioned base URL. Every request carries the deployment's client id and secret in
//! the `X-Access-Client-Id` / `X-Access-Secret` headers. Non-success statuses become
//! [`RequestFailure::Status`] with a bounded body preview, and response bodies are
//! decoded through `serde_path_to_error` so shape mismatches report the offending path.
//! Exchange rejections (4xx on the link token exchange, or a response without an access
//! token) are surfaced as [`Error::Auth`] instead.

// crates.io
use reqwest::{Method, RequestBuilder, header::ACCEPT};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use time::Date;
// self
use crate::{
	_prelude::*,
	auth::{AccessTokenResponse, LinkId, ReportId, SecretString, TaskId, UserId},
	config::BrokerConfig,
	error::{ConfigError, RequestFailure},
	obs,
	provider::{
		OrderRequest, PayrollReportRequest, ProductType, ProviderClient, ProviderFuture,
		ProviderOperation, RefreshTask, UserProfile, UserResponse,
	},
};

/// Provider client backed by a shared [`ReqwestClient`].
#[derive(Clone, Debug)]
pub struct ReqwestProviderClient {
	client: ReqwestClient,
	base_url: Url,
	client_id: String,
	secret: SecretString,
}
impl ReqwestProviderClient {
	/// Header carrying the deployment's client identifier.
	pub const CLIENT_ID_HEADER: &'static str = "X-Access-Client-Id";
	/// Header carrying the deployment's API secret.
	pub const SECRET_HEADER: &'static str = "X-Access-Secret";

	/// Builds a client with a default reqwest stack.
	pub fn new(
		base_url: Url,
		client_id: impl Into<String>,
		secret: impl Into<SecretString>,
	) -> Result<Self> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::from)?;

		Self::with_client(client, base_url, client_id, secret)
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	///
	/// A base URL without a trailing slash is normalized so relative endpoint paths
	/// extend it instead of replacing its last segment.
	pub fn with_client(
		client: ReqwestClient,
		mut base_url: Url,
		client_id: impl Into<String>,
		secret: impl Into<SecretString>,
	) -> Result<Self> {
		if base_url.cannot_be_a_base() {
			return Err(ConfigError::CannotBeABase { url: base_url.to_string() }.into());
		}
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		Ok(Self { client, base_url, client_id: client_id.into(), secret: secret.into() })
	}

	/// Builds a client from the deployment configuration.
	pub fn from_config(config: &BrokerConfig) -> Result<Self> {
		Self::new(config.base_url.clone(), config.client_id.clone(), config.secret.clone())
	}

	/// Base URL every endpoint path is resolved against.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	fn endpoint(&self, path: &str) -> Result<Url> {
		self.base_url.join(path).map_err(|e| ConfigError::from(e).into())
	}

	/// Appends percent-encoded segments, so caller-supplied values can never climb out of
	/// the resource they address.
	fn endpoint_from_segments(&self, segments: &[&str]) -> Result<Url> {
		let mut url = self.base_url.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::CannotBeABase { url: self.base_url.to_string() })?
			.pop_if_empty()
			.extend(segments);

		Ok(url)
	}

	async fn get<T>(&self, operation: ProviderOperation, url: Url) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.send(operation, self.request(operation, Method::GET, url)).await
	}

	async fn post<T, B>(&self, operation: ProviderOperation, url: Url, body: &B) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize + Sync,
	{
		self.send(operation, self.request(operation, Method::POST, url).json(body)).await
	}

	fn request(&self, operation: ProviderOperation, method: Method, url: Url) -> RequestBuilder {
		obs::log_provider_request(operation, url.path());

		self.client
			.request(method, url)
			.header(Self::CLIENT_ID_HEADER, &self.client_id)
			.header(Self::SECRET_HEADER, self.secret.expose())
			.header(ACCEPT, "application/json")
	}

	async fn send<T>(&self, operation: ProviderOperation, request: RequestBuilder) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let response = request.send().await.map_err(|e| Error::provider(operation, e.into()))?;
		let status = response.status();
		let bytes = response.bytes().await.map_err(|e| Error::provider(operation, e.into()))?;

		if !status.is_success() {
			let failure = RequestFailure::status(status.as_u16(), &bytes);

			return Err(map_status_failure(operation, failure));
		}

		decode(&bytes).map_err(|source| Error::provider(operation, source))
	}
}
impl ProviderClient for ReqwestProviderClient {
	fn exchange_token<'a>(
		&'a self,
		link_token: &'a str,
	) -> ProviderFuture<'a, AccessTokenResponse> {
		Box::pin(async move {
			let body: ExchangeBody = self
				.post(
					ProviderOperation::ExchangeToken,
					self.endpoint("link-access-tokens/")?,
					&json!({ "public_token": link_token }),
				)
				.await?;

			body.into_response()
		})
	}

	fn create_refresh_job<'a>(
		&'a self,
		access_token: &'a SecretString,
	) -> ProviderFuture<'a, RefreshTask> {
		Box::pin(async move {
			self.post(
				ProviderOperation::CreateRefreshJob,
				self.endpoint("refresh/tasks/")?,
				&json!({ "access_token": access_token.expose() }),
			)
			.await
		})
	}

	fn get_refresh_job_status<'a>(
		&'a self,
		task_id: &'a TaskId,
	) -> ProviderFuture<'a, RefreshTask> {
		Box::pin(async move {
			let url = self.endpoint_from_segments(&["refresh", "tasks", task_id, ""])?;

			self.get(ProviderOperation::RefreshJobStatus, url).await
		})
	}

	fn get_link_report<'a>(
		&'a self,
		link_id: &'a LinkId,
		product: &'a ProductType,
	) -> ProviderFuture<'a, Value> {
		Box::pin(async move {
			let url =
				self.endpoint_from_segments(&["links", link_id, product.path_segment()?, "report"])?;

			self.get(ProviderOperation::LinkReport, url).await
		})
	}

	fn get_employee_directory<'a>(
		&'a self,
		access_token: &'a SecretString,
	) -> ProviderFuture<'a, Value> {
		Box::pin(async move {
			self.post(
				ProviderOperation::EmployeeDirectory,
				self.endpoint("administrators/directories/")?,
				&json!({ "access_token": access_token.expose() }),
			)
			.await
		})
	}

	fn request_payroll_report<'a>(
		&'a self,
		access_token: &'a SecretString,
		start: Date,
		end: Date,
	) -> ProviderFuture<'a, PayrollReportRequest> {
		Box::pin(async move {
			self.post(
				ProviderOperation::RequestPayrollReport,
				self.endpoint("administrators/payrolls/")?,
				&json!({
					"access_token": access_token.expose(),
					"start_date": start.to_string(),
					"end_date": end.to_string(),
				}),
			)
			.await
		})
	}

	fn get_payroll_by_id<'a>(&'a self, report_id: &'a ReportId) -> ProviderFuture<'a, Value> {
		Box::pin(async move {
			let url = self.endpoint_from_segments(&["administrators", "payrolls", report_id])?;

			self.get(ProviderOperation::PayrollReport, url).await
		})
	}

	fn create_user<'a>(&'a self, profile: &'a UserProfile) -> ProviderFuture<'a, UserResponse> {
		Box::pin(async move {
			self.post(ProviderOperation::CreateUser, self.endpoint("users/")?, profile).await
		})
	}

	fn create_user_bridge_token<'a>(
		&'a self,
		user_id: &'a UserId,
		product: &'a ProductType,
	) -> ProviderFuture<'a, Value> {
		Box::pin(async move {
			self.post(
				ProviderOperation::CreateBridgeToken,
				self.endpoint_from_segments(&["users", user_id, "tokens", ""])?,
				&json!({ "product_type": product.as_str() }),
			)
			.await
		})
	}

	fn create_order<'a>(&'a self, order: &'a OrderRequest) -> ProviderFuture<'a, Value> {
		Box::pin(async move {
			self.post(ProviderOperation::CreateOrder, self.endpoint("orders/")?, order).await
		})
	}
}

/// Exchange response; a malformed `link_id` fails decoding like any other shape error.
#[derive(Deserialize)]
struct ExchangeBody {
	#[serde(default)]
	access_token: Option<SecretString>,
	#[serde(default)]
	link_id: Option<LinkId>,
	#[serde(flatten)]
	extra: Map<String, Value>,
}
impl ExchangeBody {
	fn into_response(self) -> Result<AccessTokenResponse> {
		let access_token = self
			.access_token
			.filter(|token| !token.is_empty())
			.ok_or_else(|| rejected("Failed to obtain access token"))?;
		let link_id = self.link_id.ok_or_else(|| rejected("Exchange response has no link_id"))?;

		Ok(AccessTokenResponse { access_token, link_id, extra: self.extra })
	}
}

fn rejected(reason: &str) -> Error {
	Error::Auth { reason: reason.into(), status: None }
}

fn decode<T>(bytes: &[u8]) -> Result<T, RequestFailure>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| RequestFailure::Decode { source })
}

fn map_status_failure(operation: ProviderOperation, failure: RequestFailure) -> Error {
	match (operation, &failure) {
		(ProviderOperation::ExchangeToken, RequestFailure::Status { status, body_preview })
			if (400..500).contains(status) =>
			Error::Auth { reason: body_preview.clone(), status: Some(*status) },
		_ => Error::provider(operation, failure),
	}
}

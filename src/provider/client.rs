//! Provider client contract used by every broker flow.

// crates.io
use serde_json::{Map, Value};
use time::Date;
// self
use crate::{
	_prelude::*,
	auth::{AccessTokenResponse, LinkId, ReportId, SecretString, TaskId, UserId},
	provider::{ProductType, RefreshTask},
};

/// Boxed future returned by [`ProviderClient`] operations.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Authenticated request layer against the verification provider.
///
/// Implementations are stateless with respect to sessions: every operation receives
/// the credential it needs explicitly. Failures must surface as
/// [`Error::ProviderRequestFailed`], except token exchange rejections, which surface as
/// [`Error::Auth`].
pub trait ProviderClient
where
	Self: Send + Sync,
{
	/// Exchanges a short-lived link token for an access token.
	fn exchange_token<'a>(
		&'a self,
		link_token: &'a str,
	) -> ProviderFuture<'a, AccessTokenResponse>;

	/// Requests creation of a refresh job for the access token.
	fn create_refresh_job<'a>(
		&'a self,
		access_token: &'a SecretString,
	) -> ProviderFuture<'a, RefreshTask>;

	/// Fetches the current status of a refresh job.
	fn get_refresh_job_status<'a>(
		&'a self,
		task_id: &'a TaskId,
	) -> ProviderFuture<'a, RefreshTask>;

	/// Fetches the product report for a linked account.
	fn get_link_report<'a>(
		&'a self,
		link_id: &'a LinkId,
		product: &'a ProductType,
	) -> ProviderFuture<'a, Value>;

	/// Fetches the employer's employee directory.
	fn get_employee_directory<'a>(
		&'a self,
		access_token: &'a SecretString,
	) -> ProviderFuture<'a, Value>;

	/// Requests a payroll report covering `start..=end`.
	fn request_payroll_report<'a>(
		&'a self,
		access_token: &'a SecretString,
		start: Date,
		end: Date,
	) -> ProviderFuture<'a, PayrollReportRequest>;

	/// Fetches a payroll report by identifier.
	fn get_payroll_by_id<'a>(&'a self, report_id: &'a ReportId) -> ProviderFuture<'a, Value>;

	/// Creates a provider user.
	fn create_user<'a>(&'a self, profile: &'a UserProfile) -> ProviderFuture<'a, UserResponse>;

	/// Creates a bridge token for an existing user.
	fn create_user_bridge_token<'a>(
		&'a self,
		user_id: &'a UserId,
		product: &'a ProductType,
	) -> ProviderFuture<'a, Value>;

	/// Creates an order, which carries its own bridge token.
	fn create_order<'a>(&'a self, order: &'a OrderRequest) -> ProviderFuture<'a, Value>;
}

/// Acknowledgement returned when a payroll report is requested.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PayrollReportRequest {
	/// Identifier used to fetch the report.
	pub payroll_report_id: ReportId,
	/// Remaining provider fields.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Provider user created during bridge token issuance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
	/// User identifier.
	pub id: UserId,
	/// Remaining provider fields.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Applicant details sent when creating a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
	/// Caller-side identifier for the user.
	pub external_user_id: String,
	/// Given name.
	pub first_name: String,
	/// Family name.
	pub last_name: String,
	/// Contact email.
	pub email: String,
}
impl UserProfile {
	/// Sandbox applicant with a freshly generated external identifier.
	pub fn sandbox() -> Self {
		Self {
			external_user_id: random_reference(),
			first_name: "John".into(),
			last_name: "Johnson".into(),
			email: "j.johnson@example.com".into(),
		}
	}
}

/// Order details sent when the deployment issues bridge tokens through orders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
	/// Caller-side order reference.
	pub order_number: String,
	/// Applicant given name.
	pub first_name: String,
	/// Applicant family name.
	pub last_name: String,
	/// Applicant contact email.
	pub email: String,
	/// Products requested by the order.
	pub products: Vec<ProductType>,
}
impl OrderRequest {
	/// Sandbox order for the given product with a freshly generated order number.
	pub fn sandbox(product: ProductType) -> Self {
		let applicant = UserProfile::sandbox();

		Self {
			order_number: random_reference(),
			first_name: applicant.first_name,
			last_name: applicant.last_name,
			email: applicant.email,
			products: vec![product],
		}
	}
}

fn random_reference() -> String {
	hex::encode(rand::random::<[u8; 16]>())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn sandbox_references_are_unique_hex() {
		let first = UserProfile::sandbox();
		let second = UserProfile::sandbox();

		assert_eq!(first.external_user_id.len(), 32);
		assert!(first.external_user_id.chars().all(|c| c.is_ascii_hexdigit()));
		assert_ne!(first.external_user_id, second.external_user_id);
	}

	#[test]
	fn order_serializes_products_by_wire_name() {
		let order = OrderRequest::sandbox(ProductType::Income);
		let payload = serde_json::to_value(&order).expect("Order should serialize.");

		assert_eq!(payload["products"], serde_json::json!(["income"]));
		assert_eq!(payload["first_name"], "John");
	}
}

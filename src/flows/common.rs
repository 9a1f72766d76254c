//! Shared report shapes and the administrator report assembly used by several flows.

// crates.io
use serde_json::Value;
use time::{Date, macros::date};
// self
use crate::{
	_prelude::*,
	auth::{AccessTokenResponse, SecretString},
	provider::{ProductType, ProviderClient},
};

/// Inclusive date window for administrator payroll reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollWindow {
	/// First day covered.
	pub start: Date,
	/// Last day covered.
	pub end: Date,
}
impl PayrollWindow {
	/// Sandbox window the provider's test payrolls are populated for.
	pub const SANDBOX: Self = Self { start: date!(2020 - 01 - 01), end: date!(2020 - 02 - 01) };

	/// Creates a window; `start` after `end` is swapped so the window is never inverted.
	pub fn new(start: Date, end: Date) -> Self {
		if start <= end { Self { start, end } } else { Self { start: end, end: start } }
	}
}
impl Default for PayrollWindow {
	fn default() -> Self {
		Self::SANDBOX
	}
}

/// Structured "nothing to do" result for product types without a report shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftError {
	/// Always `false`.
	pub success: bool,
	/// Human-readable reason.
	pub error: String,
}
impl SoftError {
	/// Soft error returned when the configured product type has no refresh report shape.
	pub fn unsupported_product() -> Self {
		Self { success: false, error: "Unknown API_PRODUCT_TYPE".into() }
	}
}

/// Report produced once a refresh (or direct retrieval) completes.
///
/// Serialized without a tag so clients receive the bare report body. A link report may
/// carry any keys, so the shape is not decodable back into a variant.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportPayload {
	/// Employer directory combined with the payroll report for the configured window.
	Admin {
		/// Employee directory.
		directory: Value,
		/// Payroll report.
		payroll: Value,
	},
	/// Soft error for unsupported product types.
	Unsupported(SoftError),
	/// Product-specific link report, returned verbatim.
	LinkReport(Value),
}
/// Fetches the employee directory, requests a payroll report for `window`, and fetches it.
pub(crate) async fn admin_report<C>(
	provider: &C,
	access_token: &SecretString,
	window: PayrollWindow,
) -> Result<ReportPayload>
where
	C: ?Sized + ProviderClient,
{
	let directory = provider.get_employee_directory(access_token).await?;
	let requested = provider.request_payroll_report(access_token, window.start, window.end).await?;
	let payroll = provider.get_payroll_by_id(&requested.payroll_report_id).await?;

	Ok(ReportPayload::Admin { directory, payroll })
}

/// Returns the report shape a refresh yields for `product`, or the soft error.
pub(crate) async fn product_report<C>(
	provider: &C,
	token: &AccessTokenResponse,
	product: &ProductType,
	window: PayrollWindow,
) -> Result<ReportPayload>
where
	C: ?Sized + ProviderClient,
{
	match product {
		product if product.uses_link_report() =>
			Ok(ReportPayload::LinkReport(provider.get_link_report(&token.link_id, product).await?)),
		ProductType::Admin => admin_report(provider, &token.access_token, window).await,
		_ => Ok(ReportPayload::Unsupported(SoftError::unsupported_product())),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn sandbox_window_renders_as_iso_dates() {
		let window = PayrollWindow::default();

		assert_eq!(window.start.to_string(), "2020-01-01");
		assert_eq!(window.end.to_string(), "2020-02-01");
	}

	#[test]
	fn inverted_windows_are_swapped() {
		let window = PayrollWindow::new(date!(2021 - 03 - 01), date!(2021 - 01 - 01));

		assert_eq!(window.start, date!(2021 - 01 - 01));
		assert_eq!(window.end, date!(2021 - 03 - 01));
	}

	#[test]
	fn payloads_serialize_to_client_shapes() {
		let soft =
			serde_json::to_value(ReportPayload::Unsupported(SoftError::unsupported_product()))
				.expect("Soft error should serialize.");

		assert_eq!(
			soft,
			serde_json::json!({ "success": false, "error": "Unknown API_PRODUCT_TYPE" })
		);

		let admin = serde_json::to_value(ReportPayload::Admin {
			directory: serde_json::json!({ "employees": [] }),
			payroll: serde_json::json!({ "id": "report-1" }),
		})
		.expect("Admin payload should serialize.");

		assert_eq!(admin["directory"]["employees"], serde_json::json!([]));
		assert_eq!(admin["payroll"]["id"], "report-1");

		let report = serde_json::to_value(ReportPayload::LinkReport(serde_json::json!({ "a": 1 })))
			.expect("Link report should serialize.");

		assert_eq!(report, serde_json::json!({ "a": 1 }));

		let lookalike = serde_json::json!({ "directory": [], "payroll": {}, "success": false });
		let report = serde_json::to_value(ReportPayload::LinkReport(lookalike.clone()))
			.expect("Link report should serialize.");

		assert_eq!(report, lookalike);
	}
}

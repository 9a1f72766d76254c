//! Provider-facing contract (behavior) and the data it exchanges.
//!
//! `client` defines [`ProviderClient`], the transport-agnostic seam the broker calls
//! for every provider interaction. `product` and `task` model the closed product-type
//! set and the refresh-job status machine the orchestrator branches on.

pub mod client;
pub mod product;
pub mod task;

pub use client::*;
pub use product::*;
pub use task::*;

// self
use crate::_prelude::*;

/// Provider operations, used to label failures, spans, and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderOperation {
	/// Link token to access token exchange.
	ExchangeToken,
	/// Refresh job creation.
	CreateRefreshJob,
	/// Refresh job status lookup.
	RefreshJobStatus,
	/// Link report retrieval.
	LinkReport,
	/// Employee directory retrieval.
	EmployeeDirectory,
	/// Payroll report request.
	RequestPayrollReport,
	/// Payroll report retrieval.
	PayrollReport,
	/// User creation.
	CreateUser,
	/// User bridge token creation.
	CreateBridgeToken,
	/// Order creation.
	CreateOrder,
}
impl ProviderOperation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderOperation::ExchangeToken => "exchange_token",
			ProviderOperation::CreateRefreshJob => "create_refresh_job",
			ProviderOperation::RefreshJobStatus => "refresh_job_status",
			ProviderOperation::LinkReport => "link_report",
			ProviderOperation::EmployeeDirectory => "employee_directory",
			ProviderOperation::RequestPayrollReport => "request_payroll_report",
			ProviderOperation::PayrollReport => "payroll_report",
			ProviderOperation::CreateUser => "create_user",
			ProviderOperation::CreateBridgeToken => "create_bridge_token",
			ProviderOperation::CreateOrder => "create_order",
		}
	}
}
impl Display for ProviderOperation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

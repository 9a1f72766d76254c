//! Product types selected per deployment.

// std
use std::convert::Infallible;
// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, id},
};

/// Provider product a deployment is configured for.
///
/// Parsing never fails: values outside the known set are kept in
/// [`ProductType::Unsupported`] so the refresh dispatch can answer with a soft error
/// instead of rejecting the configuration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProductType {
	/// Employment verification.
	Employment,
	/// Income verification.
	Income,
	/// Employer administrator access (directory + payroll).
	Admin,
	/// Direct deposit switch.
	DirectDeposit,
	/// Paycheck-linked loan.
	Pll,
	/// Any value the broker has no report shape for.
	Unsupported(String),
}
impl ProductType {
	/// Returns the provider's wire name for the product.
	pub fn as_str(&self) -> &str {
		match self {
			ProductType::Employment => "employment",
			ProductType::Income => "income",
			ProductType::Admin => "admin",
			ProductType::DirectDeposit => "direct_deposit",
			ProductType::Pll => "pll",
			ProductType::Unsupported(raw) => raw,
		}
	}

	/// Returns `true` when the product's refresh result is a link report.
	pub fn uses_link_report(&self) -> bool {
		matches!(self, ProductType::Employment | ProductType::Income)
	}

	/// Returns the wire name for use as a single URL path segment.
	///
	/// Known products always pass. An [`Unsupported`](Self::Unsupported) value is rejected
	/// when it could not stand alone as a segment, e.g. `..` or `a/b`.
	pub fn path_segment(&self) -> Result<&str, IdentifierError> {
		let raw = self.as_str();

		id::validate_view("Product", raw)?;

		Ok(raw)
	}
}
impl Display for ProductType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ProductType {
	type Err = Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s {
			"employment" => ProductType::Employment,
			"income" => ProductType::Income,
			"admin" => ProductType::Admin,
			"direct_deposit" => ProductType::DirectDeposit,
			"pll" => ProductType::Pll,
			other => ProductType::Unsupported(other.to_owned()),
		})
	}
}
impl From<String> for ProductType {
	fn from(value: String) -> Self {
		match value.parse() {
			Ok(product) => product,
			Err(never) => match never {},
		}
	}
}
impl From<ProductType> for String {
	fn from(value: ProductType) -> Self {
		match value {
			ProductType::Unsupported(raw) => raw,
			known => known.as_str().to_owned(),
		}
	}
}

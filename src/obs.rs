//! Optional observability hooks for token operations.
//!
//! # Feature Flags
//!
//! - `tracing`: every token endpoint call runs inside an `oauthapp_provider.operation` span
//!   carrying the `provider` and `grant` fields.
//! - `metrics`: the `oauthapp_provider_operation_total` counter is incremented per attempt,
//!   success, and failure, labeled by `grant` and `outcome`.
//!
//! Neither hook logs errors; errors are returned to the caller untouched.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each token operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// The operation started a token endpoint call.
	Attempt,
	/// A token was returned.
	Success,
	/// An error was returned.
	Failure,
}
impl OperationOutcome {
	/// Stable label for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

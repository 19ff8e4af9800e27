// self
use crate::{obs::OperationOutcome, provider::GrantType};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_operation_outcome(grant: GrantType, outcome: OperationOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauthapp_provider_operation_total",
			"grant" => grant.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (grant, outcome);
	}
}

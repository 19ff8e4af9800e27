//! Crate-level error types shared by the registry, providers, and the token executor.

pub mod endpoint;

pub use endpoint::*;

// self
use crate::{_prelude::*, provider::GrantType};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Errors are handed back to the immediate caller untouched. [`Error::is_retryable`] is the
/// only classification offered; retry policy itself belongs to the host.
#[derive(Debug, ThisError)]
pub enum Error {
	/// A factory is already registered under the requested name.
	#[error("Provider `{name}` is already registered.")]
	DuplicateProvider {
		/// Name that collided with an existing registration.
		name: String,
	},
	/// No factory is registered under the requested name.
	#[error("No provider is registered as `{name}`.")]
	UnknownProvider {
		/// Name that failed to resolve.
		name: String,
	},
	/// Provider configuration was rejected by its factory.
	#[error(transparent)]
	InvalidConfiguration(#[from] ConfigError),
	/// Refresh was requested for a token without a refresh token.
	#[error("Token does not carry a refresh token.")]
	MissingRefreshToken,
	/// The provider's descriptor does not enable the requested grant.
	#[error("Provider `{provider}` does not support the {grant} grant.")]
	UnsupportedOperation {
		/// Provider type name.
		provider: String,
		/// Grant that was requested.
		grant: GrantType,
	},
	/// Transport failure, cancellation, or deadline expiry.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token endpoint rejected the request.
	#[error(transparent)]
	TokenEndpoint(#[from] TokenEndpointError),
	/// Token endpoint answered successfully with a body that is not a token.
	#[error(transparent)]
	MalformedResponse(#[from] MalformedResponseError),
}
impl Error {
	/// Returns `true` when the failure is a reasonable retry candidate.
	///
	/// Transport failures (other than explicit cancellation) and 5xx/429 endpoint responses
	/// qualify; construction-time errors and 4xx rejections do not.
	pub fn is_retryable(&self) -> bool {
		match self {
			Self::Transport(err) => !matches!(err, TransportError::Cancelled),
			Self::TokenEndpoint(err) => err.is_retryable(),
			_ => false,
		}
	}
}

/// Construction-time configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Configuration contains a key the provider family does not recognize.
	#[error("Unrecognized configuration key `{key}`.")]
	UnknownKey {
		/// Offending key.
		key: String,
	},
	/// Typed configuration could not be deserialized.
	#[error("Configuration is invalid at `{}`.", .source.path())]
	Invalid {
		/// Deserialization failure including the key path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Placeholder value is empty or contains characters outside the allowed set.
	#[error("Placeholder `{name}` has an invalid value {value:?}.")]
	InvalidPlaceholder {
		/// Placeholder name.
		name: String,
		/// Rejected value.
		value: String,
	},
	/// The same placeholder was declared twice.
	#[error("Placeholder `{name}` is declared more than once.")]
	DuplicatePlaceholder {
		/// Placeholder name.
		name: String,
	},
	/// Endpoint template references a placeholder that was never declared.
	#[error("The {endpoint} endpoint template has an undeclared placeholder: {template}.")]
	UndeclaredPlaceholder {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Template that failed validation.
		template: String,
	},
	/// Endpoint template does not render to a valid URL.
	#[error("The {endpoint} endpoint is not a valid URL.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoints must use HTTP(S).
	#[error("The {endpoint} endpoint must use http or https: {url}.")]
	UnsupportedScheme {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Token endpoint is mandatory for all providers.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Authorization code grant enabled without an authorization endpoint.
	#[error("The authorization_code grant requires an authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// At least one grant must be supported.
	#[error("Descriptor must enable at least one grant type.")]
	NoSupportedGrants,
}
impl ConfigError {
	/// Wraps a typed configuration deserialization failure.
	pub fn invalid(source: serde_path_to_error::Error<serde_json::Error>) -> Self {
		Self::Invalid { source }
	}
}

/// Transport-level failures (network, IO, cancellation).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
	/// HTTP request construction failed.
	#[error("Token request could not be constructed.")]
	Request(#[from] oauth2::http::Error),
	/// HTTP client failed without a typed cause.
	#[error("HTTP client error occurred while calling the token endpoint: {message}.")]
	Other {
		/// Client-supplied description.
		message: String,
	},
	/// The caller cancelled the operation while the request was in flight.
	#[error("Token request was cancelled.")]
	Cancelled,
	/// The caller's deadline elapsed while the request was in flight.
	#[error("Token request exceeded its deadline.")]
	DeadlineExceeded(#[source] tokio::time::error::Elapsed),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

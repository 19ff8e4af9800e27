//! Token endpoint rejections and malformed responses, plus OAuth error-body heuristics.

// self
use crate::_prelude::*;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Token endpoint answered with a non-success status (or an OAuth `error` body).
///
/// The full body is retained for the host; only the [`Display`] form is truncated.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Token endpoint returned HTTP {status}: {}", truncate_preview(.body))]
pub struct TokenEndpointError {
	/// HTTP status code returned by the token endpoint.
	pub status: u16,
	/// Raw response body.
	pub body: String,
	/// `Retry-After` hint from upstream, if supplied.
	pub retry_after: Option<Duration>,
}
impl TokenEndpointError {
	/// Creates an error without a retry hint.
	pub fn new(status: u16, body: impl Into<String>) -> Self {
		Self { status, body: body.into(), retry_after: None }
	}

	/// Attaches a `Retry-After` hint.
	pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
		self.retry_after = retry_after;

		self
	}

	/// Returns `true` for server-side (5xx) and throttling (429) responses.
	pub fn is_retryable(&self) -> bool {
		self.status >= 500 || self.status == 429
	}

	/// Parses the RFC 6749 §5.2 error fields from a JSON or form-encoded body.
	pub fn oauth_error(&self) -> Option<OAuthErrorBody> {
		let body = self.body.trim();

		if body.starts_with('{') {
			return serde_json::from_str::<OAuthErrorBody>(body).ok().filter(|e| !e.error.is_empty());
		}

		let mut parsed = OAuthErrorBody::default();

		for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
			match key.as_ref() {
				"error" => parsed.error = value.into_owned(),
				"error_description" => parsed.error_description = Some(value.into_owned()),
				"error_uri" => parsed.error_uri = Some(value.into_owned()),
				_ => {},
			}
		}

		if parsed.error.is_empty() { None } else { Some(parsed) }
	}

	/// Heuristic classification of the rejection.
	///
	/// Structured OAuth fields win, then body text hints, then the HTTP status code.
	pub fn kind(&self) -> EndpointErrorKind {
		if let Some(parsed) = self.oauth_error() {
			if let Some(kind) = classify_oauth_error(&parsed) {
				return kind;
			}
		}
		if let Some(kind) = classify_body(&self.body) {
			return kind;
		}

		classify_status(self.status)
	}
}

/// RFC 6749 §5.2 error response fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthErrorBody {
	/// Error code such as `invalid_grant`.
	#[serde(default)]
	pub error: String,
	/// Human-readable description.
	#[serde(default)]
	pub error_description: Option<String>,
	/// Link to error documentation.
	#[serde(default)]
	pub error_uri: Option<String>,
}

/// Coarse classes of token endpoint rejections.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointErrorKind {
	/// Provider rejected the authorization grant (bad code/refresh token).
	InvalidGrant,
	/// Client authentication failed.
	InvalidClient,
	/// Requested scopes exceed what the client may obtain.
	InsufficientScope,
	/// Failure is temporary.
	Transient,
}

/// Token endpoint returned a success status but the body is not a usable token.
#[derive(Debug, ThisError)]
pub enum MalformedResponseError {
	/// JSON body could not be parsed.
	#[error("Token endpoint returned malformed JSON at `{}`.", .source.path())]
	Json {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code.
		status: u16,
	},
	/// The response omitted `access_token`.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken {
		/// HTTP status code.
		status: u16,
	},
	/// `expires_in` is neither absent nor a whole number of seconds.
	#[error("Token endpoint returned an invalid expires_in value: {value}.")]
	InvalidExpiresIn {
		/// Raw value as received.
		value: String,
	},
	/// `expires_in` does not fit the supported time range.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}

fn truncate_preview(body: &str) -> String {
	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body.to_owned();
	}

	let mut buf = body.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

fn classify_oauth_error(body: &OAuthErrorBody) -> Option<EndpointErrorKind> {
	match_exact_value(&body.error)
		.or_else(|| body.error_description.as_deref().and_then(match_exact_value))
		.or_else(|| body.error_description.as_deref().and_then(classify_body))
}

fn match_exact_value(value: &str) -> Option<EndpointErrorKind> {
	if value.eq_ignore_ascii_case("invalid_grant") || value.eq_ignore_ascii_case("access_denied") {
		Some(EndpointErrorKind::InvalidGrant)
	} else if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
	{
		Some(EndpointErrorKind::InvalidClient)
	} else if value.eq_ignore_ascii_case("invalid_scope")
		|| value.eq_ignore_ascii_case("insufficient_scope")
	{
		Some(EndpointErrorKind::InsufficientScope)
	} else if value.eq_ignore_ascii_case("temporarily_unavailable")
		|| value.eq_ignore_ascii_case("server_error")
	{
		Some(EndpointErrorKind::Transient)
	} else {
		None
	}
}

fn classify_body(body: &str) -> Option<EndpointErrorKind> {
	let lowered = body.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("invalid_grant") => Some(EndpointErrorKind::InvalidGrant),
		text if text.contains("invalid_client") => Some(EndpointErrorKind::InvalidClient),
		text if text.contains("insufficient_scope") || text.contains("invalid_scope") =>
			Some(EndpointErrorKind::InsufficientScope),
		text if text.contains("temporarily_unavailable") => Some(EndpointErrorKind::Transient),
		_ => None,
	}
}

fn classify_status(status: u16) -> EndpointErrorKind {
	match status {
		400 | 404 | 410 => EndpointErrorKind::InvalidGrant,
		401 => EndpointErrorKind::InvalidClient,
		403 => EndpointErrorKind::InsufficientScope,
		_ => EndpointErrorKind::Transient,
	}
}

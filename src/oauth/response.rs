// crates.io
use oauth2::{
	HttpResponse,
	http::{
		HeaderMap,
		header::{CONTENT_TYPE, RETRY_AFTER},
	},
};
use serde_json::{Map, Value};
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	auth::{Token, TokenSecret},
	error::{MalformedResponseError, TokenEndpointError},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BodyFormat {
	Form,
	Json,
}
impl BodyFormat {
	fn detect(content_type: Option<&str>, body: &str) -> Self {
		let media_type = content_type
			.and_then(|value| value.split(';').next())
			.map(|value| value.trim().to_ascii_lowercase())
			.filter(|value| !value.is_empty());

		match media_type.as_deref() {
			Some("application/x-www-form-urlencoded" | "text/plain") => Self::Form,
			Some(_) => Self::Json,
			None if body.trim_start().starts_with('{') => Self::Json,
			None => Self::Form,
		}
	}
}

#[derive(Debug, Deserialize)]
struct RawTokenResponse {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	token_type: Option<String>,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	expires_in: Option<Value>,
	#[serde(default)]
	error: Option<String>,
	#[serde(flatten)]
	extra: Map<String, Value>,
}

/// Turns a token endpoint answer into a [`Token`] or a classified error.
pub(super) fn parse(response: HttpResponse, now: OffsetDateTime) -> Result<Token> {
	let status = response.status().as_u16();
	let body = String::from_utf8_lossy(response.body());

	if !response.status().is_success() {
		return Err(TokenEndpointError::new(status, &*body)
			.with_retry_after(parse_retry_after(response.headers(), now))
			.into());
	}

	let content_type = response.headers().get(CONTENT_TYPE).and_then(|value| value.to_str().ok());
	let raw = match BodyFormat::detect(content_type, &body) {
		BodyFormat::Json => {
			let mut de = serde_json::Deserializer::from_str(&body);

			serde_path_to_error::deserialize::<_, RawTokenResponse>(&mut de)
		},
		BodyFormat::Form => {
			let fields = url::form_urlencoded::parse(body.as_bytes())
				.map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
				.collect::<Map<_, _>>();

			serde_path_to_error::deserialize::<_, RawTokenResponse>(Value::Object(fields))
		},
	}
	.map_err(|source| MalformedResponseError::Json { source, status })?;

	build_token(raw, status, &body, now)
}

fn build_token(raw: RawTokenResponse, status: u16, body: &str, now: OffsetDateTime) -> Result<Token> {
	let Some(access_token) = raw.access_token.filter(|token| !token.is_empty()) else {
		if raw.error.is_some_and(|error| !error.is_empty()) {
			return Err(TokenEndpointError::new(status, body).into());
		}

		return Err(MalformedResponseError::MissingAccessToken { status }.into());
	};
	let expiry = match parse_expires_in(raw.expires_in.as_ref())? {
		Some(delta) => Some(now.checked_add(delta).ok_or(MalformedResponseError::ExpiresInOutOfRange)?),
		None => None,
	};

	Ok(Token {
		access_token: TokenSecret::new(access_token),
		token_type: raw.token_type.unwrap_or_default(),
		refresh_token: raw.refresh_token.filter(|token| !token.is_empty()).map(TokenSecret::new),
		expiry,
		extra: raw.extra,
	})
}

/// `expires_in` may arrive as a number or a numeric string; zero means "no expiry".
fn parse_expires_in(value: Option<&Value>) -> Result<Option<Duration>, MalformedResponseError> {
	let invalid = |value: &Value| MalformedResponseError::InvalidExpiresIn { value: value.to_string() };
	let secs = match value {
		None | Some(Value::Null) => return Ok(None),
		Some(value @ Value::Number(number)) => number.as_u64().ok_or_else(|| invalid(value))?,
		Some(Value::String(text)) if text.trim().is_empty() => return Ok(None),
		Some(Value::String(text)) => text
			.trim()
			.parse::<u64>()
			.map_err(|_| MalformedResponseError::InvalidExpiresIn { value: text.clone() })?,
		Some(other) => return Err(invalid(other)),
	};

	if secs == 0 {
		return Ok(None);
	}

	let secs = i64::try_from(secs).map_err(|_| MalformedResponseError::ExpiresInOutOfRange)?;

	Ok(Some(Duration::seconds(secs)))
}

fn parse_retry_after(headers: &HeaderMap, now: OffsetDateTime) -> Option<Duration> {
	let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(secs.into()));
	}

	let delta = OffsetDateTime::parse(raw, &Rfc2822).ok()? - now;

	delta.is_positive().then_some(delta)
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::StatusCode;
	use time::macros;
	// self
	use super::*;

	const NOW: OffsetDateTime = macros::datetime!(2025-01-01 00:00 UTC);

	fn response(status: u16, content_type: Option<&str>, body: &str) -> HttpResponse {
		let mut response = HttpResponse::new(body.as_bytes().to_vec());

		*response.status_mut() = StatusCode::from_u16(status).expect("Fixture status should be valid.");

		if let Some(value) = content_type {
			response
				.headers_mut()
				.insert(CONTENT_TYPE, value.parse().expect("Fixture header should be valid."));
		}

		response
	}

	#[test]
	fn form_bodies_parse_into_tokens() {
		let token = parse(
			response(
				200,
				Some("application/x-www-form-urlencoded; charset=utf-8"),
				"access_token=abcd&refresh_token=efgh&token_type=bearer&expires_in=60&scope=repo",
			),
			NOW,
		)
		.expect("Form body should parse.");

		assert_eq!(token.access_token.expose(), "abcd");
		assert_eq!(token.token_type(), "Bearer");
		assert_eq!(token.refresh_token.as_ref().map(TokenSecret::expose), Some("efgh"));
		assert_eq!(token.expiry, Some(NOW + Duration::seconds(60)));
		assert_eq!(token.extra("scope"), Some(&Value::from("repo")));
	}

	#[test]
	fn json_bodies_keep_extra_fields() {
		let token = parse(
			response(
				200,
				Some("application/json"),
				"{\"access_token\":\"mnop\",\"token_type\":\"bearer\",\"expires_in\":\"3600\",\"id_token\":\"jwt\"}",
			),
			NOW,
		)
		.expect("JSON body should parse.");

		assert_eq!(token.expiry, Some(NOW + Duration::hours(1)));
		assert_eq!(token.extra("id_token"), Some(&Value::from("jwt")));
		assert!(token.refresh_token.is_none());
	}

	#[test]
	fn missing_content_type_is_sniffed() {
		let json = parse(response(200, None, " {\"access_token\":\"a\"}"), NOW)
			.expect("Sniffed JSON body should parse.");
		let form = parse(response(200, None, "access_token=b"), NOW)
			.expect("Sniffed form body should parse.");

		assert_eq!(json.access_token.expose(), "a");
		assert_eq!(form.access_token.expose(), "b");
		assert_eq!(json.expiry, None);
	}

	#[test]
	fn zero_expires_in_means_no_expiry() {
		let token = parse(response(200, Some("text/plain"), "access_token=a&expires_in=0"), NOW)
			.expect("Form body should parse.");

		assert_eq!(token.expiry, None);
	}

	#[test]
	fn error_statuses_become_endpoint_errors() {
		let mut rejected = response(429, Some("application/json"), "{\"error\":\"slow_down\"}");

		rejected.headers_mut().insert(RETRY_AFTER, "30".parse().expect("Header should parse."));

		let err = parse(rejected, NOW).expect_err("429 must be an error.");

		match err {
			Error::TokenEndpoint(inner) => {
				assert_eq!(inner.status, 429);
				assert_eq!(inner.retry_after, Some(Duration::seconds(30)));
				assert!(inner.is_retryable());
			},
			other => panic!("Unexpected error: {other:?}"),
		}
	}

	#[test]
	fn success_status_with_oauth_error_is_an_endpoint_error() {
		let err = parse(
			response(200, Some("application/x-www-form-urlencoded"), "error=bad_verification_code"),
			NOW,
		)
		.expect_err("OAuth error bodies must not become tokens.");

		assert!(matches!(err, Error::TokenEndpoint(ref inner) if inner.status == 200));
	}

	#[test]
	fn malformed_success_bodies_are_reported() {
		let err = parse(response(200, Some("application/json"), "{\"access_token\":"), NOW)
			.expect_err("Truncated JSON must fail.");

		assert!(matches!(err, Error::MalformedResponse(MalformedResponseError::Json { .. })));

		let err = parse(response(200, Some("application/json"), "{\"token_type\":\"bearer\"}"), NOW)
			.expect_err("Missing access token must fail.");

		assert!(matches!(
			err,
			Error::MalformedResponse(MalformedResponseError::MissingAccessToken { status: 200 })
		));

		let err = parse(
			response(200, Some("application/json"), "{\"access_token\":\"a\",\"expires_in\":\"soon\"}"),
			NOW,
		)
		.expect_err("Non-numeric expires_in must fail.");

		assert!(matches!(
			err,
			Error::MalformedResponse(MalformedResponseError::InvalidExpiresIn { .. })
		));
	}

	#[test]
	fn retry_after_accepts_http_dates() {
		let mut headers = HeaderMap::new();

		headers.insert(
			RETRY_AFTER,
			"Wed, 01 Jan 2025 00:01:00 +0000".parse().expect("Header should parse."),
		);

		assert_eq!(parse_retry_after(&headers, NOW), Some(Duration::minutes(1)));

		headers.insert(RETRY_AFTER, "soon".parse().expect("Header should parse."));

		assert_eq!(parse_retry_after(&headers, NOW), None);
	}
}

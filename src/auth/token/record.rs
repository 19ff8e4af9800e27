//! Normalized token values, validity checks, and builders.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Errors produced by [`TokenBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TokenBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when the relative expiry cannot be represented as an instant.
	#[error("Token expiry is out of range.")]
	ExpiryOutOfRange,
}

/// Token issued by a provider's token endpoint.
///
/// Tokens are plain values: nothing in this crate keeps a copy, and persistence is the
/// caller's concern.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Token type exactly as returned by the provider; see [`Token::token_type`].
	#[serde(default)]
	pub token_type: String,
	/// Refresh token secret, if the provider issued one.
	#[serde(default)]
	pub refresh_token: Option<TokenSecret>,
	/// Absolute expiry instant; `None` means the provider did not bound the lifetime.
	#[serde(default)]
	pub expiry: Option<OffsetDateTime>,
	/// Remaining response fields (for example `id_token` or `scope`).
	#[serde(default)]
	pub extra: Map<String, Value>,
}
impl Token {
	/// Returns a builder for constructing tokens.
	pub fn builder() -> TokenBuilder {
		TokenBuilder::default()
	}

	/// Canonical token type: `Bearer`, `MAC`, and `Basic` regardless of case; an empty type
	/// defaults to `Bearer`; anything else is returned unchanged.
	pub fn token_type(&self) -> &str {
		canonical_token_type(&self.token_type)
	}

	/// Returns `true` if the token is usable at `instant`.
	///
	/// A token is valid when its access token is non-empty and it either has no expiry or
	/// `instant` is strictly before the expiry. No clock-skew allowance is applied.
	pub fn is_valid_at(&self, instant: OffsetDateTime) -> bool {
		!self.access_token.is_empty() && self.expiry.is_none_or(|expiry| instant < expiry)
	}

	/// Checks validity against the current UTC instant.
	pub fn is_valid(&self) -> bool {
		self.is_valid_at(OffsetDateTime::now_utc())
	}

	/// Time left before expiry at `instant`, clamped at zero; `None` without an expiry.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Option<Duration> {
		self.expiry.map(|expiry| (expiry - instant).max(Duration::ZERO))
	}

	/// Looks up a provider-specific response field.
	pub fn extra(&self, key: &str) -> Option<&Value> {
		self.extra.get(key)
	}

	/// Keeps `previous` as the refresh token when this token was issued without one.
	pub(crate) fn or_refresh_token(mut self, previous: &TokenSecret) -> Self {
		if self.refresh_token.as_ref().is_none_or(TokenSecret::is_empty) {
			self.refresh_token = Some(previous.clone());
		}

		self
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type())
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expiry", &self.expiry)
			.field("extra", &self.extra.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Builder for [`Token`].
#[derive(Clone, Debug, Default)]
pub struct TokenBuilder {
	access_token: Option<TokenSecret>,
	token_type: String,
	refresh_token: Option<TokenSecret>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
	extra: Map<String, Value>,
}
impl TokenBuilder {
	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the raw token type.
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = token_type.into();

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the instant relative expiries are measured from (defaults to now).
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Records an additional response field.
	pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.extra.insert(key.into(), value.into());

		self
	}

	/// Consumes the builder and produces a [`Token`].
	pub fn build(self) -> Result<Token, TokenBuilderError> {
		let access_token = self.access_token.ok_or(TokenBuilderError::MissingAccessToken)?;
		let expiry = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => Some(instant),
			(None, Some(delta)) => Some(
				self.issued_at
					.unwrap_or_else(OffsetDateTime::now_utc)
					.checked_add(delta)
					.ok_or(TokenBuilderError::ExpiryOutOfRange)?,
			),
			(None, None) => None,
		};

		Ok(Token {
			access_token,
			token_type: self.token_type,
			refresh_token: self.refresh_token,
			expiry,
			extra: self.extra,
		})
	}
}

fn canonical_token_type(raw: &str) -> &str {
	if raw.is_empty() || raw.eq_ignore_ascii_case("bearer") {
		"Bearer"
	} else if raw.eq_ignore_ascii_case("mac") {
		"MAC"
	} else if raw.eq_ignore_ascii_case("basic") {
		"Basic"
	} else {
		raw
	}
}

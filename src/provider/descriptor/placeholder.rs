// self
use crate::{_prelude::*, error::ConfigError};

/// A `{name}` variable in an endpoint template together with its fallback value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
	/// Name referenced as `{name}` in templates and used as the configuration key.
	pub name: String,
	/// Value used when neither configuration nor the request supplies one.
	pub fallback: String,
}
impl Placeholder {
	/// Declares a placeholder.
	pub fn new(name: impl Into<String>, fallback: impl Into<String>) -> Self {
		Self { name: name.into(), fallback: fallback.into() }
	}

	/// Text this placeholder occupies inside a template.
	pub(crate) fn token(&self) -> String {
		format!("{{{}}}", self.name)
	}

	/// Picks the effective value for one call.
	///
	/// A configuration binding always wins; a request value is used only when no binding
	/// exists and the value is well formed; otherwise the fallback applies.
	pub(crate) fn select<'a>(
		&'a self,
		bound: Option<&'a str>,
		requested: Option<&'a str>,
	) -> &'a str {
		bound
			.or_else(|| requested.filter(|value| is_valid_value(value)))
			.unwrap_or(&self.fallback)
	}
}

/// Returns `true` for non-empty values made of ASCII alphanumerics and `-._~`.
///
/// These are the RFC 3986 unreserved characters, so a substituted value can never change the
/// structure of the URL it lands in.
pub fn is_valid_value(value: &str) -> bool {
	!value.is_empty()
		&& value.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~'))
}

pub(crate) fn validate_value(name: &str, value: &str) -> Result<(), ConfigError> {
	if is_valid_value(value) {
		Ok(())
	} else {
		Err(ConfigError::InvalidPlaceholder { name: name.to_owned(), value: value.to_owned() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn values_are_limited_to_unreserved_characters() {
		assert!(is_valid_value("contoso"));
		assert!(is_valid_value("a-b.c_d~9"));
		assert!(!is_valid_value(""));
		assert!(!is_valid_value("evil/path"));
		assert!(!is_valid_value("host?x=1"));
		assert!(!is_valid_value("ünicode"));
	}

	#[test]
	fn selection_prefers_binding_then_valid_request_then_fallback() {
		let tenant = Placeholder::new("tenant", "organizations");

		assert_eq!(tenant.select(Some("northwind"), Some("contoso")), "northwind");
		assert_eq!(tenant.select(None, Some("contoso")), "contoso");
		assert_eq!(tenant.select(None, Some("../admin")), "organizations");
		assert_eq!(tenant.select(None, None), "organizations");
		assert_eq!(tenant.token(), "{tenant}");
	}
}

//! Endpoint descriptors: where a provider lives and how clients authenticate to it.
//!
//! A descriptor stores endpoint *templates*. Placeholders such as `{tenant}` are bound from
//! configuration when the provider is built, or resolved per call by [`EndpointDescriptor::resolve`].

/// Builder API for assembling descriptors.
pub mod builder;
/// Grant flags wired into descriptors.
pub mod grant;
/// Template placeholders.
pub mod placeholder;

pub use builder::*;
pub use grant::*;
pub use placeholder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Where client credentials go on token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStyle {
	/// `client_id`/`client_secret` as form body parameters.
	InParams,
	#[default]
	/// HTTP Basic authorization header.
	InHeader,
}

/// Immutable endpoint description bound to one provider instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EndpointDescriptorBuilder")]
pub struct EndpointDescriptor {
	authorization: Option<String>,
	token: String,
	auth_style: AuthStyle,
	placeholders: Vec<Placeholder>,
	bindings: BTreeMap<String, String>,
	supported_grants: SupportedGrants,
}
impl EndpointDescriptor {
	/// Creates a builder for the given token endpoint template.
	pub fn builder(token_template: impl Into<String>) -> EndpointDescriptorBuilder {
		EndpointDescriptorBuilder::new(token_template)
	}

	/// Authorization endpoint template, if the authorization code flow is available.
	pub fn authorization_template(&self) -> Option<&str> {
		self.authorization.as_deref()
	}

	/// Token endpoint template.
	pub fn token_template(&self) -> &str {
		&self.token
	}

	/// Client authentication style.
	pub fn auth_style(&self) -> AuthStyle {
		self.auth_style
	}

	/// Declared placeholders.
	pub fn placeholders(&self) -> &[Placeholder] {
		&self.placeholders
	}

	/// Placeholder values fixed by configuration.
	pub fn bindings(&self) -> &BTreeMap<String, String> {
		&self.bindings
	}

	/// Enabled grants.
	pub fn supported_grants(&self) -> SupportedGrants {
		self.supported_grants
	}

	/// Checks whether the descriptor enables `grant`.
	pub fn supports(&self, grant: GrantType) -> bool {
		self.supported_grants.supports(grant)
	}

	/// Renders the endpoints for one call.
	///
	/// `requested` holds request-time provider options. Only keys naming a declared, unbound
	/// placeholder are consulted; anything else is ignored.
	pub fn resolve(&self, requested: &BTreeMap<String, String>) -> Result<ResolvedEndpoint, ConfigError> {
		let values = self
			.placeholders
			.iter()
			.map(|placeholder| {
				let value = placeholder.select(
					self.bindings.get(&placeholder.name).map(String::as_str),
					requested.get(&placeholder.name).map(String::as_str),
				);

				(placeholder.token(), value)
			})
			.collect::<Vec<_>>();
		let authorization = self
			.authorization
			.as_deref()
			.map(|template| render("authorization", template, &values))
			.transpose()?;
		let token = render("token", &self.token, &values)?;

		Ok(ResolvedEndpoint { authorization, token, auth_style: self.auth_style })
	}
}

/// Concrete endpoints after placeholder substitution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedEndpoint {
	/// Authorization endpoint, absent when the authorization code flow is unavailable.
	pub authorization: Option<Url>,
	/// Token endpoint.
	pub token: Url,
	/// Client authentication style.
	pub auth_style: AuthStyle,
}

pub(crate) fn render(
	endpoint: &'static str,
	template: &str,
	values: &[(String, &str)],
) -> Result<Url, ConfigError> {
	let rendered =
		values.iter().fold(template.to_owned(), |acc, (token, value)| acc.replace(token, value));

	if rendered.contains(['{', '}']) {
		return Err(ConfigError::UndeclaredPlaceholder { endpoint, template: template.to_owned() });
	}

	let url = Url::parse(&rendered).map_err(|source| ConfigError::InvalidEndpoint { endpoint, source })?;

	match url.scheme() {
		"http" | "https" => Ok(url),
		_ => Err(ConfigError::UnsupportedScheme { endpoint, url: url.to_string() }),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn tenant_descriptor(binding: Option<&str>) -> EndpointDescriptor {
		let mut builder = EndpointDescriptor::builder("https://login.example.com/{tenant}/token")
			.authorization_template("https://login.example.com/{tenant}/authorize")
			.placeholder(Placeholder::new("tenant", "organizations"));

		if let Some(value) = binding {
			builder = builder.bind("tenant", value);
		}

		builder.build().expect("Descriptor fixture should be valid.")
	}

	fn requested(value: &str) -> BTreeMap<String, String> {
		BTreeMap::from([("tenant".to_owned(), value.to_owned())])
	}

	#[test]
	fn configured_tenant_beats_request() {
		let resolved = tenant_descriptor(Some("northwind"))
			.resolve(&requested("contoso"))
			.expect("Resolution should succeed.");

		assert_eq!(resolved.token.as_str(), "https://login.example.com/northwind/token");
		assert_eq!(
			resolved.authorization.map(String::from).as_deref(),
			Some("https://login.example.com/northwind/authorize")
		);
	}

	#[test]
	fn request_tenant_applies_when_unbound() {
		let descriptor = tenant_descriptor(None);
		let resolved = descriptor.resolve(&requested("contoso")).expect("Resolution should succeed.");

		assert_eq!(resolved.token.path(), "/contoso/token");

		let resolved = descriptor.resolve(&BTreeMap::new()).expect("Resolution should succeed.");

		assert_eq!(resolved.token.path(), "/organizations/token");

		let resolved =
			descriptor.resolve(&requested("a/../../b")).expect("Invalid values are ignored.");

		assert_eq!(resolved.token.path(), "/organizations/token");
	}

	#[test]
	fn render_rejects_non_http_schemes() {
		let err = render("token", "ftp://example.com/token", &[])
			.expect_err("Non-HTTP endpoints must be rejected.");

		assert!(matches!(err, ConfigError::UnsupportedScheme { endpoint: "token", .. }));
	}

	#[test]
	fn auth_style_defaults_to_header_and_uses_snake_case() {
		assert_eq!(AuthStyle::default(), AuthStyle::InHeader);
		assert_eq!(
			serde_json::to_string(&AuthStyle::InParams).expect("AuthStyle should serialize."),
			"\"in_params\""
		);
	}
}

//! Built-in provider families.
//!
//! Three shapes cover every family: fixed endpoints, endpoints templated on configuration
//! placeholders (Azure AD tenants), and endpoints supplied wholesale by configuration
//! (`custom`).

// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	provider::{
		AuthStyle, EndpointDescriptor, EndpointDescriptorBuilder, GrantType, Placeholder,
		Provider, ProviderConfig, ProviderFactory,
	},
};

/// Factory for providers whose endpoints are fixed apart from declared placeholders.
///
/// Configuration keys must name a declared placeholder; each one binds that placeholder for
/// the provider's lifetime.
#[derive(Clone, Debug)]
pub struct TemplateFactory {
	template: EndpointDescriptorBuilder,
}
impl TemplateFactory {
	/// Wraps a descriptor template; it is validated again for every provider built.
	pub fn new(template: EndpointDescriptorBuilder) -> Self {
		Self { template }
	}

	/// Factory for a provider with fixed authorization and token endpoints.
	pub fn basic(
		authorization_url: impl Into<String>,
		token_url: impl Into<String>,
		auth_style: AuthStyle,
	) -> Self {
		Self::new(
			EndpointDescriptor::builder(token_url)
				.authorization_template(authorization_url)
				.auth_style(auth_style),
		)
	}
}
impl ProviderFactory for TemplateFactory {
	fn build(&self, name: &str, config: &ProviderConfig) -> Result<Provider, ConfigError> {
		let mut builder = self.template.clone();

		for (key, value) in config {
			if !builder.placeholders.iter().any(|placeholder| placeholder.name == *key) {
				return Err(ConfigError::UnknownKey { key: key.clone() });
			}

			builder = builder.bind(key, value);
		}

		Ok(Provider::new(name, builder.build()?))
	}
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CustomConfig {
	#[serde(default)]
	auth_code_url: Option<Url>,
	token_url: Url,
	#[serde(default)]
	auth_style: AuthStyle,
}

/// Factory for providers described entirely by configuration.
///
/// Keys: `token_url` (required), `auth_code_url` (optional; without it the authorization code
/// flow is unavailable), and `auth_style` (`in_header` or `in_params`, default `in_header`).
#[derive(Clone, Copy, Debug, Default)]
pub struct CustomFactory;
impl ProviderFactory for CustomFactory {
	fn build(&self, name: &str, config: &ProviderConfig) -> Result<Provider, ConfigError> {
		let fields = config
			.iter()
			.map(|(key, value)| (key.clone(), Value::String(value.clone())))
			.collect::<Map<_, _>>();
		let config = serde_path_to_error::deserialize::<_, CustomConfig>(Value::Object(fields))
			.map_err(ConfigError::invalid)?;
		let mut builder =
			EndpointDescriptor::builder(config.token_url.as_str()).auth_style(config.auth_style);

		if let Some(url) = config.auth_code_url {
			builder = builder.authorization_template(url.as_str());
		}

		Ok(Provider::new(name, builder.build()?))
	}
}

pub(crate) fn factories() -> Vec<(&'static str, Arc<dyn ProviderFactory>)> {
	vec![
		entry(
			"bitbucket",
			TemplateFactory::basic(
				"https://bitbucket.org/site/oauth2/authorize",
				"https://bitbucket.org/site/oauth2/access_token",
				AuthStyle::InHeader,
			),
		),
		entry(
			"github",
			TemplateFactory::new(
				EndpointDescriptor::builder("https://github.com/login/oauth/access_token")
					.authorization_template("https://github.com/login/oauth/authorize")
					.auth_style(AuthStyle::InParams)
					.support_grants([GrantType::AuthorizationCode, GrantType::RefreshToken]),
			),
		),
		entry(
			"gitlab",
			TemplateFactory::basic(
				"https://gitlab.com/oauth/authorize",
				"https://gitlab.com/oauth/token",
				AuthStyle::InParams,
			),
		),
		entry(
			"google",
			TemplateFactory::basic(
				"https://accounts.google.com/o/oauth2/auth",
				"https://oauth2.googleapis.com/token",
				AuthStyle::InParams,
			),
		),
		entry(
			"microsoft_azure_ad",
			TemplateFactory::new(
				EndpointDescriptor::builder(
					"https://login.microsoftonline.com/{tenant}/oauth2/v2.0/token",
				)
				.authorization_template(
					"https://login.microsoftonline.com/{tenant}/oauth2/v2.0/authorize",
				)
				.auth_style(AuthStyle::InParams)
				.placeholder(Placeholder::new("tenant", "organizations")),
			),
		),
		entry(
			"slack",
			TemplateFactory::basic(
				"https://slack.com/oauth/authorize",
				"https://slack.com/api/oauth.access",
				AuthStyle::InHeader,
			),
		),
		entry("custom", CustomFactory),
	]
}

fn entry<F>(name: &'static str, factory: F) -> (&'static str, Arc<dyn ProviderFactory>)
where
	F: 'static + ProviderFactory,
{
	(name, Arc::new(factory))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config(pairs: &[(&str, &str)]) -> ProviderConfig {
		pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
	}

	#[test]
	fn every_fixed_builtin_builds_with_empty_config() {
		for (name, factory) in factories().into_iter().filter(|(name, _)| *name != "custom") {
			let provider = factory
				.build(name, &ProviderConfig::new())
				.unwrap_or_else(|e| panic!("Built-in `{name}` failed to build: {e}"));

			assert_eq!(provider.name(), name);
			assert!(provider.descriptor().supports(GrantType::AuthorizationCode));
		}
	}

	#[test]
	fn template_factory_rejects_unknown_keys() {
		let factory = TemplateFactory::basic(
			"http://localhost/authorize",
			"http://localhost/token",
			AuthStyle::InParams,
		);
		let err = factory
			.build("basic", &config(&[("tenant", "x")]))
			.expect_err("Basic providers accept no configuration.");

		assert!(matches!(err, ConfigError::UnknownKey { ref key } if key == "tenant"));
	}

	#[test]
	fn azure_tenant_binds_from_config() {
		let (_, azure) = factories()
			.into_iter()
			.find(|(name, _)| *name == "microsoft_azure_ad")
			.expect("Azure AD should be built in.");
		let provider = azure
			.build("microsoft_azure_ad", &config(&[("tenant", "northwind")]))
			.expect("Tenant configuration should be accepted.");

		assert_eq!(
			provider.descriptor().bindings().get("tenant").map(String::as_str),
			Some("northwind")
		);
		assert!(matches!(
			azure.build("microsoft_azure_ad", &config(&[("tenant", "north/wind")])),
			Err(ConfigError::InvalidPlaceholder { .. })
		));
	}

	#[test]
	fn custom_factory_reads_typed_config() {
		let provider = CustomFactory
			.build(
				"custom",
				&config(&[
					("auth_code_url", "https://idp.example.com/authorize"),
					("token_url", "https://idp.example.com/token"),
					("auth_style", "in_params"),
				]),
			)
			.expect("Custom configuration should be accepted.");

		assert_eq!(provider.descriptor().auth_style(), AuthStyle::InParams);
		assert!(provider.descriptor().supports(GrantType::AuthorizationCode));

		let token_only = CustomFactory
			.build("custom", &config(&[("token_url", "https://idp.example.com/token")]))
			.expect("Token URL alone is enough.");

		assert_eq!(token_only.descriptor().auth_style(), AuthStyle::InHeader);
		assert!(!token_only.descriptor().supports(GrantType::AuthorizationCode));
	}

	#[test]
	fn custom_factory_reports_bad_keys() {
		let err = CustomFactory
			.build("custom", &config(&[("token_url", "https://x/token"), ("tenant", "a")]))
			.expect_err("Unknown keys must be rejected.");

		assert!(matches!(err, ConfigError::Invalid { .. }));

		let err = CustomFactory
			.build("custom", &config(&[("token_url", "https://x/token"), ("auth_style", "sideways")]))
			.expect_err("Unknown auth styles must be rejected.");

		assert_eq!(err.to_string(), "Configuration is invalid at `auth_style`.");

		assert!(CustomFactory.build("custom", &ProviderConfig::new()).is_err());
	}
}

// std
use std::collections::BTreeMap;
// self
use oauthapp_provider::{
	error::{ConfigError, Error},
	provider::{ProviderConfig, Registry, RequestOption},
};

fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
	pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

#[test]
fn azure_ad_tenant_precedence() {
	let cases = [
		(
			"plugin tenant without attempted override",
			map(&[("tenant", "northwind")]),
			map(&[]),
			"https://login.microsoftonline.com/northwind/oauth2/v2.0/authorize?client_id=foo&response_type=code&state=123456",
		),
		(
			"plugin tenant with attempted override",
			map(&[("tenant", "northwind")]),
			map(&[("tenant", "contoso")]),
			"https://login.microsoftonline.com/northwind/oauth2/v2.0/authorize?client_id=foo&response_type=code&state=123456",
		),
		(
			"no plugin tenant",
			map(&[]),
			map(&[("tenant", "contoso")]),
			"https://login.microsoftonline.com/contoso/oauth2/v2.0/authorize?client_id=foo&response_type=code&state=123456",
		),
		(
			"no tenant",
			map(&[]),
			map(&[]),
			"https://login.microsoftonline.com/organizations/oauth2/v2.0/authorize?client_id=foo&response_type=code&state=123456",
		),
	];

	for (name, config, options, expected) in cases {
		let provider = Registry::global()
			.new_provider("microsoft_azure_ad", &config)
			.unwrap_or_else(|e| panic!("{name}: provider should build: {e}"));
		let url = provider
			.public("foo")
			.auth_code_url("123456", [RequestOption::ProviderOptions(options)])
			.unwrap_or_else(|| panic!("{name}: Azure AD supports the authorization code flow."));

		assert_eq!(url.as_str(), expected, "{name}");
	}
}

#[test]
fn azure_ad_rejects_bad_configuration() {
	let registry = Registry::global();

	assert!(matches!(
		registry.new_provider("microsoft_azure_ad", &map(&[("tenant", "../common")])),
		Err(Error::InvalidConfiguration(ConfigError::InvalidPlaceholder { .. }))
	));
	assert!(matches!(
		registry.new_provider("microsoft_azure_ad", &map(&[("region", "eu")])),
		Err(Error::InvalidConfiguration(ConfigError::UnknownKey { .. }))
	));
	assert!(matches!(
		registry.new_provider("azure", &ProviderConfig::new()),
		Err(Error::UnknownProvider { .. })
	));
}

#[test]
fn invalid_request_tenants_fall_back_silently() {
	let provider = Registry::global()
		.new_provider("microsoft_azure_ad", &ProviderConfig::new())
		.expect("Azure AD should build without configuration.");
	let url = provider
		.public("foo")
		.auth_code_url("s", [RequestOption::provider_option("tenant", "evil.example/x?")])
		.expect("Invalid request tenants must not disable the flow.");

	assert_eq!(url.path(), "/organizations/oauth2/v2.0/authorize");
}

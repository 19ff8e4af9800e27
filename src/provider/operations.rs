//! Configured providers and their public/private operation views.

// std
use std::ops::Deref;
// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{Token, TokenSecret},
	context::Context,
	http::TokenHttpClient,
	oauth::{self, TokenRequest},
	provider::{EndpointDescriptor, GrantType, RequestOption, RequestOptions},
};

/// A configured provider instance.
///
/// Providers are immutable once built, so one instance can serve any number of concurrent
/// callers; wrap it in an [`Arc`] to share it across tasks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Provider {
	name: String,
	descriptor: EndpointDescriptor,
}
impl Provider {
	/// Binds a descriptor to a provider type name.
	pub fn new(name: impl Into<String>, descriptor: EndpointDescriptor) -> Self {
		Self { name: name.into(), descriptor }
	}

	/// Provider type name, as registered.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Bound endpoint descriptor.
	pub fn descriptor(&self) -> &EndpointDescriptor {
		&self.descriptor
	}

	/// Operations available to a client without a secret.
	pub fn public(&self, client_id: impl Into<String>) -> PublicOperations<'_> {
		PublicOperations { provider: self, client_id: client_id.into() }
	}

	/// Operations available to a confidential client.
	pub fn private(
		&self,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> PrivateOperations<'_> {
		PrivateOperations {
			public: self.public(client_id),
			client_secret: TokenSecret::new(client_secret),
		}
	}

	fn ensure_supported(&self, grant: GrantType) -> Result<()> {
		if self.descriptor.supports(grant) {
			Ok(())
		} else {
			Err(Error::UnsupportedOperation { provider: self.name.clone(), grant })
		}
	}
}

/// Operations that need only a client identifier.
#[derive(Clone, Debug)]
pub struct PublicOperations<'p> {
	provider: &'p Provider,
	client_id: String,
}
impl<'p> PublicOperations<'p> {
	/// Provider these operations run against.
	pub fn provider(&self) -> &'p Provider {
		self.provider
	}

	/// Client identifier bound to this view.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Builds the URL the resource owner visits to grant access.
	///
	/// Returns `None` when the provider does not offer the authorization code flow. Query
	/// parameters are applied in this order, later values replacing earlier ones: the template's
	/// own query, `response_type`, `client_id`, `redirect_uri`, `state`, `scope`, then raw URL
	/// parameters. Keys are emitted sorted.
	pub fn auth_code_url<I>(&self, state: &str, options: I) -> Option<Url>
	where
		I: IntoIterator<Item = RequestOption>,
	{
		if !self.provider.descriptor.supports(GrantType::AuthorizationCode) {
			return None;
		}

		let options = options.into_iter().collect::<RequestOptions>();
		let mut url = self.provider.descriptor.resolve(&options.provider_options).ok()?.authorization?;
		let mut query = url.query_pairs().into_owned().collect::<BTreeMap<_, _>>();

		query.insert("response_type".into(), "code".into());
		query.insert("client_id".into(), self.client_id.clone());

		if let Some(redirect) = &options.redirect_url {
			query.insert("redirect_uri".into(), redirect.to_string());
		}

		query.insert("state".into(), state.to_owned());

		if !options.scopes.is_empty() {
			query.insert("scope".into(), options.scopes.joined());
		}

		query.extend(options.url_params);

		let encoded = form_urlencoded::Serializer::new(String::new()).extend_pairs(&query).finish();

		url.set_query(Some(&encoded));

		Some(url)
	}
}

/// Operations for a confidential client; dereferences to [`PublicOperations`].
#[derive(Clone, Debug)]
pub struct PrivateOperations<'p> {
	public: PublicOperations<'p>,
	client_secret: TokenSecret,
}
impl PrivateOperations<'_> {
	/// Exchanges an authorization code for a token.
	///
	/// Sends `code`, `redirect_uri` when given, and raw URL parameters. Scopes are not sent;
	/// they were fixed when the code was issued.
	pub async fn auth_code_exchange<C, I>(&self, cx: &Context<C>, code: &str, options: I) -> Result<Token>
	where
		C: TokenHttpClient,
		I: IntoIterator<Item = RequestOption>,
	{
		let options = options.into_iter().collect::<RequestOptions>();
		let mut params = vec![("code".to_owned(), code.to_owned())];

		if let Some(redirect) = &options.redirect_url {
			params.push(("redirect_uri".into(), redirect.to_string()));
		}

		self.execute(cx, GrantType::AuthorizationCode, params, options).await
	}

	/// Obtains a fresh token using the refresh token carried by `token`.
	///
	/// The returned token keeps the original refresh token when the provider does not rotate
	/// it.
	pub async fn refresh_token<C, I>(&self, cx: &Context<C>, token: &Token, options: I) -> Result<Token>
	where
		C: TokenHttpClient,
		I: IntoIterator<Item = RequestOption>,
	{
		let refresh = token
			.refresh_token
			.as_ref()
			.filter(|secret| !secret.is_empty())
			.ok_or(Error::MissingRefreshToken)?;
		let options = options.into_iter().collect::<RequestOptions>();
		let mut params = vec![("refresh_token".to_owned(), refresh.expose().to_owned())];

		if !options.scopes.is_empty() {
			params.push(("scope".into(), options.scopes.joined()));
		}

		let refreshed = self.execute(cx, GrantType::RefreshToken, params, options).await?;

		Ok(refreshed.or_refresh_token(refresh))
	}

	/// Obtains an app-only token with the client's own credentials.
	pub async fn client_credentials<C, I>(&self, cx: &Context<C>, options: I) -> Result<Token>
	where
		C: TokenHttpClient,
		I: IntoIterator<Item = RequestOption>,
	{
		let options = options.into_iter().collect::<RequestOptions>();
		let mut params = Vec::new();

		if !options.scopes.is_empty() {
			params.push(("scope".to_owned(), options.scopes.joined()));
		}

		self.execute(cx, GrantType::ClientCredentials, params, options).await
	}

	async fn execute<C>(
		&self,
		cx: &Context<C>,
		grant: GrantType,
		grant_params: Vec<(String, String)>,
		options: RequestOptions,
	) -> Result<Token>
	where
		C: TokenHttpClient,
	{
		let provider = self.public.provider;

		provider.ensure_supported(grant)?;

		let endpoint = provider.descriptor.resolve(&options.provider_options)?;
		// Raw parameters go first so the grant's own fields win on collision.
		let mut params = options
			.url_params
			.into_iter()
			.filter(|(key, _)| !grant_params.iter().any(|(grant_key, _)| grant_key == key))
			.collect::<Vec<_>>();

		params.extend(grant_params);

		oauth::execute(
			cx,
			TokenRequest {
				provider: &provider.name,
				grant,
				endpoint,
				params,
				client_id: &self.public.client_id,
				client_secret: &self.client_secret,
			},
		)
		.await
	}
}
impl<'p> Deref for PrivateOperations<'p> {
	type Target = PublicOperations<'p>;

	fn deref(&self) -> &Self::Target {
		&self.public
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::ScriptedHttpClient,
		auth::ScopeSet,
		provider::{AuthStyle, Placeholder},
	};

	fn basic() -> Provider {
		Provider::new(
			"basic",
			EndpointDescriptor::builder("http://localhost/token")
				.authorization_template("http://localhost/authorize?access_type=offline")
				.auth_style(AuthStyle::InParams)
				.build()
				.expect("Descriptor fixture should be valid."),
		)
	}

	fn token_only() -> Provider {
		Provider::new(
			"machine",
			EndpointDescriptor::builder("https://auth.example.com/{region}/token")
				.placeholder(Placeholder::new("region", "eu"))
				.support_grant(GrantType::ClientCredentials)
				.build()
				.expect("Descriptor fixture should be valid."),
		)
	}

	#[test]
	fn auth_code_url_sorts_keys_and_lets_url_params_win() {
		let provider = basic();
		let url = provider
			.public("foo")
			.auth_code_url(
				"xyz",
				[
					RequestOption::Scopes(ScopeSet::new(["b", "a"]).expect("Scopes should be valid.")),
					RequestOption::url_param("access_type", "online"),
				],
			)
			.expect("Authorization code flow should be available.");

		assert_eq!(
			url.as_str(),
			"http://localhost/authorize?access_type=online&client_id=foo&response_type=code&scope=b+a&state=xyz"
		);
	}

	#[test]
	fn auth_code_url_is_none_without_authorization_grant() {
		assert!(token_only().public("foo").auth_code_url("s", []).is_none());
	}

	#[tokio::test]
	async fn unsupported_grants_fail_before_any_request() {
		let client = ScriptedHttpClient::default();
		let cx = Context::new(client.clone());
		let provider = token_only();
		let err = provider
			.private("foo", "bar")
			.auth_code_exchange(&cx, "code", [])
			.await
			.expect_err("Authorization code grant is disabled.");

		assert!(matches!(
			err,
			Error::UnsupportedOperation { grant: GrantType::AuthorizationCode, .. }
		));
		assert!(client.requests().is_empty());
	}

	#[tokio::test]
	async fn refresh_requires_a_refresh_token() {
		let client = ScriptedHttpClient::default();
		let cx = Context::new(client.clone());
		let token = Token::builder().access_token("a").build().expect("Token fixture should build.");
		let err = basic()
			.private("foo", "bar")
			.refresh_token(&cx, &token, [])
			.await
			.expect_err("Refreshing without a refresh token must fail.");

		assert!(matches!(err, Error::MissingRefreshToken));
		assert!(client.requests().is_empty());
	}

	#[tokio::test]
	async fn grant_fields_beat_raw_params_and_placeholders_resolve_per_call() {
		let client = ScriptedHttpClient::default();

		client.push_form(200, "access_token=t&token_type=bearer");

		let cx = Context::new(client.clone());
		let token = token_only()
			.private("foo", "bar")
			.client_credentials(
				&cx,
				[
					RequestOption::Scopes(ScopeSet::new(["read"]).expect("Scopes should be valid.")),
					RequestOption::url_param("scope", "admin"),
					RequestOption::url_param("audience", "api"),
					RequestOption::provider_option("region", "us"),
				],
			)
			.await
			.expect("Client credentials should succeed.");
		let requests = client.requests();
		let form = requests[0].form();

		assert_eq!(token.access_token.expose(), "t");
		assert_eq!(requests[0].uri, "https://auth.example.com/us/token");
		assert_eq!(form.get("scope").map(String::as_str), Some("read"));
		assert_eq!(form.get("audience").map(String::as_str), Some("api"));
		assert_eq!(form.get("grant_type").map(String::as_str), Some("client_credentials"));
	}
}

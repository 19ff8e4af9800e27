//! Request-shaping options applied to provider operations.

// self
use crate::{_prelude::*, auth::ScopeSet};

/// A single request-shaping directive.
///
/// Operations accept any number of options and fold them left to right into
/// [`RequestOptions`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestOption {
	/// Redirect URL sent as `redirect_uri`; a later value replaces an earlier one.
	RedirectUrl(Url),
	/// Scopes merged into the request scope set.
	Scopes(ScopeSet),
	/// Raw parameters added to the authorization URL or token request body.
	UrlParams(BTreeMap<String, String>),
	/// Provider-specific options such as a `tenant` placeholder value.
	ProviderOptions(BTreeMap<String, String>),
}
impl RequestOption {
	/// Single raw URL parameter.
	pub fn url_param(key: impl Into<String>, value: impl Into<String>) -> Self {
		Self::UrlParams(BTreeMap::from([(key.into(), value.into())]))
	}

	/// Single provider-specific option.
	pub fn provider_option(key: impl Into<String>, value: impl Into<String>) -> Self {
		Self::ProviderOptions(BTreeMap::from([(key.into(), value.into())]))
	}
}
impl From<ScopeSet> for RequestOption {
	fn from(scopes: ScopeSet) -> Self {
		Self::Scopes(scopes)
	}
}
impl From<Url> for RequestOption {
	fn from(url: Url) -> Self {
		Self::RedirectUrl(url)
	}
}

/// Options after folding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestOptions {
	/// Redirect URL, if any.
	pub redirect_url: Option<Url>,
	/// Requested scopes in first-seen order.
	pub scopes: ScopeSet,
	/// Raw URL parameters; later keys win.
	pub url_params: BTreeMap<String, String>,
	/// Provider-specific options; later keys win.
	pub provider_options: BTreeMap<String, String>,
}
impl RequestOptions {
	/// Applies one option on top of the current state.
	pub fn apply(&mut self, option: RequestOption) {
		match option {
			RequestOption::RedirectUrl(url) => self.redirect_url = Some(url),
			RequestOption::Scopes(scopes) => self.scopes.merge(&scopes),
			RequestOption::UrlParams(params) => self.url_params.extend(params),
			RequestOption::ProviderOptions(options) => self.provider_options.extend(options),
		}
	}
}
impl FromIterator<RequestOption> for RequestOptions {
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = RequestOption>,
	{
		let mut options = Self::default();

		iter.into_iter().for_each(|option| options.apply(option));

		options
	}
}

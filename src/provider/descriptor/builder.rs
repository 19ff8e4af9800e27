// std
use std::collections::BTreeSet;
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	provider::{
		AuthStyle, EndpointDescriptor, GrantType, Placeholder, SupportedGrants,
		descriptor::{self, placeholder},
	},
};

/// Builder for [`EndpointDescriptor`] values.
///
/// Also the deserialization form of a descriptor, so serialized descriptors pass the same
/// validation as hand-built ones.
#[derive(Clone, Debug, Deserialize)]
pub struct EndpointDescriptorBuilder {
	/// Authorization endpoint template (required for the authorization code grant).
	#[serde(default)]
	pub authorization: Option<String>,
	/// Token endpoint template.
	pub token: String,
	/// Client authentication style.
	#[serde(default)]
	pub auth_style: AuthStyle,
	/// Declared placeholders.
	#[serde(default)]
	pub placeholders: Vec<Placeholder>,
	/// Configuration-time placeholder values.
	#[serde(default)]
	pub bindings: BTreeMap<String, String>,
	/// Explicit grant set; derived from the endpoints when unset.
	#[serde(default)]
	pub supported_grants: Option<SupportedGrants>,
}
impl EndpointDescriptorBuilder {
	/// Creates a builder seeded with the token endpoint template.
	pub fn new(token_template: impl Into<String>) -> Self {
		Self {
			authorization: None,
			token: token_template.into(),
			auth_style: AuthStyle::default(),
			placeholders: Vec::new(),
			bindings: BTreeMap::new(),
			supported_grants: None,
		}
	}

	/// Sets the authorization endpoint template.
	pub fn authorization_template(mut self, template: impl Into<String>) -> Self {
		self.authorization = Some(template.into());

		self
	}

	/// Overrides the client authentication style.
	pub fn auth_style(mut self, style: AuthStyle) -> Self {
		self.auth_style = style;

		self
	}

	/// Declares a placeholder.
	pub fn placeholder(mut self, placeholder: Placeholder) -> Self {
		self.placeholders.push(placeholder);

		self
	}

	/// Fixes a placeholder value; request-time values can no longer change it.
	pub fn bind(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.bindings.insert(name.into(), value.into());

		self
	}

	/// Marks a single grant type as supported.
	pub fn support_grant(mut self, grant: GrantType) -> Self {
		self.supported_grants = Some(self.supported_grants.unwrap_or_default().enable(grant));

		self
	}

	/// Replaces the supported grant set.
	pub fn support_grants<I>(mut self, grants: I) -> Self
	where
		I: IntoIterator<Item = GrantType>,
	{
		self.supported_grants = Some(grants.into_iter().collect());

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	///
	/// Without an explicit grant set, the descriptor enables the authorization code grant when
	/// an authorization template exists, plus refresh token and client credentials.
	pub fn build(self) -> Result<EndpointDescriptor, ConfigError> {
		let supported_grants = self.supported_grants.unwrap_or_else(|| {
			let defaults = SupportedGrants::default()
				.enable(GrantType::RefreshToken)
				.enable(GrantType::ClientCredentials);

			if self.authorization.is_some() {
				defaults.enable(GrantType::AuthorizationCode)
			} else {
				defaults
			}
		});
		let descriptor = EndpointDescriptor {
			authorization: self.authorization,
			token: self.token,
			auth_style: self.auth_style,
			placeholders: self.placeholders,
			bindings: self.bindings,
			supported_grants,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl TryFrom<EndpointDescriptorBuilder> for EndpointDescriptor {
	type Error = ConfigError;

	fn try_from(builder: EndpointDescriptorBuilder) -> Result<Self, Self::Error> {
		builder.build()
	}
}

impl EndpointDescriptor {
	fn validate(&self) -> Result<(), ConfigError> {
		if self.token.trim().is_empty() {
			return Err(ConfigError::MissingTokenEndpoint);
		}
		if self.supported_grants.is_empty() {
			return Err(ConfigError::NoSupportedGrants);
		}
		if self.supports(GrantType::AuthorizationCode) && self.authorization.is_none() {
			return Err(ConfigError::MissingAuthorizationEndpoint);
		}

		let mut seen = BTreeSet::new();

		for declared in &self.placeholders {
			if !seen.insert(declared.name.as_str()) {
				return Err(ConfigError::DuplicatePlaceholder { name: declared.name.clone() });
			}

			placeholder::validate_value(&declared.name, &declared.fallback)?;
		}
		for (name, value) in &self.bindings {
			if !seen.contains(name.as_str()) {
				return Err(ConfigError::UnknownKey { key: name.clone() });
			}

			placeholder::validate_value(name, value)?;
		}

		// Every value that can reach a template is unreserved, so rendering with the
		// fallbacks proves every later rendering parses too.
		let fallbacks = self
			.placeholders
			.iter()
			.map(|declared| (declared.token(), declared.fallback.as_str()))
			.collect::<Vec<_>>();

		if let Some(template) = self.authorization.as_deref() {
			descriptor::render("authorization", template, &fallbacks)?;
		}

		descriptor::render("token", &self.token, &fallbacks)?;

		Ok(())
	}
}

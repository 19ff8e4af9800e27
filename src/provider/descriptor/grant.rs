// self
use crate::_prelude::*;

/// Grant types a provider can be asked to perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Authorization Code grant: authorization URL plus code exchange.
	AuthorizationCode,
	/// Refresh Token grant.
	RefreshToken,
	/// Client Credentials grant for app-only tokens.
	ClientCredentials,
}
impl GrantType {
	/// Every grant type, in the order descriptors list them.
	pub const ALL: [GrantType; 3] =
		[GrantType::AuthorizationCode, GrantType::RefreshToken, GrantType::ClientCredentials];

	/// Value sent as the `grant_type` form parameter.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
			GrantType::ClientCredentials => "client_credentials",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Grant flags enabled on a descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedGrants {
	/// Authorization Code grant.
	pub authorization_code: bool,
	/// Refresh Token grant.
	pub refresh_token: bool,
	/// Client Credentials grant.
	pub client_credentials: bool,
}
impl SupportedGrants {
	/// Returns true if `grant` is enabled.
	pub fn supports(self, grant: GrantType) -> bool {
		match grant {
			GrantType::AuthorizationCode => self.authorization_code,
			GrantType::RefreshToken => self.refresh_token,
			GrantType::ClientCredentials => self.client_credentials,
		}
	}

	/// Enables `grant`.
	pub fn enable(mut self, grant: GrantType) -> Self {
		match grant {
			GrantType::AuthorizationCode => self.authorization_code = true,
			GrantType::RefreshToken => self.refresh_token = true,
			GrantType::ClientCredentials => self.client_credentials = true,
		}

		self
	}

	/// Returns true when nothing is enabled.
	pub fn is_empty(self) -> bool {
		!self.authorization_code && !self.refresh_token && !self.client_credentials
	}

	/// Iterates over the enabled grants.
	pub fn iter(self) -> impl Iterator<Item = GrantType> {
		GrantType::ALL.into_iter().filter(move |grant| self.supports(*grant))
	}
}
impl FromIterator<GrantType> for SupportedGrants {
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = GrantType>,
	{
		iter.into_iter().fold(Self::default(), Self::enable)
	}
}

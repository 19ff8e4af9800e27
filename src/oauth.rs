//! Token endpoint executor shared by every provider family.
//!
//! Providers differ only in their descriptors; turning a grant into an HTTP exchange and the
//! answer into a [`Token`] happens here, once.

mod response;

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest,
	http::{
		Method,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue},
	},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{Token, TokenSecret},
	context::Context,
	error::TransportError,
	http::TokenHttpClient,
	obs::{self, OperationOutcome, OperationSpan},
	provider::{AuthStyle, GrantType, ResolvedEndpoint},
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// One token endpoint call, fully described.
#[derive(Debug)]
pub(crate) struct TokenRequest<'a> {
	pub(crate) provider: &'a str,
	pub(crate) grant: GrantType,
	pub(crate) endpoint: ResolvedEndpoint,
	/// Grant and option parameters; credentials are added last by [`TokenRequest::into_http`].
	pub(crate) params: Vec<(String, String)>,
	pub(crate) client_id: &'a str,
	pub(crate) client_secret: &'a TokenSecret,
}
impl TokenRequest<'_> {
	fn into_http(self) -> Result<HttpRequest, TransportError> {
		let mut form = form_urlencoded::Serializer::new(String::new());

		form.append_pair("grant_type", self.grant.as_str());

		for (key, value) in &self.params {
			if is_reserved(key) {
				continue;
			}

			form.append_pair(key, value);
		}

		let mut builder = oauth2::http::Request::builder()
			.method(Method::POST)
			.uri(self.endpoint.token.as_str())
			.header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
			.header(ACCEPT, HeaderValue::from_static("application/json"));

		match self.endpoint.auth_style {
			AuthStyle::InParams => {
				form.append_pair("client_id", self.client_id);

				if !self.client_secret.is_empty() {
					form.append_pair("client_secret", self.client_secret.expose());
				}
			},
			AuthStyle::InHeader => {
				builder = builder
					.header(AUTHORIZATION, basic_authorization(self.client_id, self.client_secret));
			},
		}

		Ok(builder.body(form.finish().into_bytes())?)
	}
}

/// Sends `request` through the context's HTTP client and parses the answer.
pub(crate) async fn execute<C>(cx: &Context<C>, request: TokenRequest<'_>) -> Result<Token>
where
	C: TokenHttpClient,
{
	let grant = request.grant;
	let span = OperationSpan::new(request.provider, grant);

	obs::record_operation_outcome(grant, OperationOutcome::Attempt);

	let result = span.instrument(send(cx, request)).await;

	obs::record_operation_outcome(
		grant,
		if result.is_ok() { OperationOutcome::Success } else { OperationOutcome::Failure },
	);

	result
}

async fn send<C>(cx: &Context<C>, request: TokenRequest<'_>) -> Result<Token>
where
	C: TokenHttpClient,
{
	let request = request.into_http()?;
	let handle = cx.http_client.handle();
	let response = cx.run(handle.call(request)).await?.map_err(map_client_error)?;

	response::parse(response, OffsetDateTime::now_utc())
}

fn map_client_error<E>(err: HttpClientError<E>) -> TransportError
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::network(*inner),
		HttpClientError::Http(inner) => TransportError::Request(inner),
		HttpClientError::Io(inner) => TransportError::Io(inner),
		HttpClientError::Other(message) => TransportError::Other { message },
		_ => TransportError::Other { message: "Unrecognized HTTP client failure.".into() },
	}
}

/// RFC 6749 §2.3.1: both parts are form-urlencoded before being joined and base64-encoded.
fn basic_authorization(client_id: &str, client_secret: &TokenSecret) -> String {
	let id = form_urlencoded::byte_serialize(client_id.as_bytes()).collect::<String>();
	let secret =
		form_urlencoded::byte_serialize(client_secret.expose().as_bytes()).collect::<String>();

	format!("Basic {}", STANDARD.encode(format!("{id}:{secret}")))
}

fn is_reserved(key: &str) -> bool {
	matches!(key, "grant_type" | "client_id" | "client_secret")
}

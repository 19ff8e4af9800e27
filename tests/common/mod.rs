#![allow(dead_code)]

// std
use std::{
	collections::BTreeMap,
	future::Future,
	pin::Pin,
	sync::{Arc, Mutex},
};
// self
use oauthapp_provider::{
	http::TokenHttpClient,
	oauth2::{
		AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
		http::{StatusCode, header::CONTENT_TYPE},
	},
	url::form_urlencoded,
};

pub const FORM: &str = "application/x-www-form-urlencoded";

/// Answer produced by a [`RoutedHttpClient`] handler.
pub struct Reply {
	pub status: u16,
	pub content_type: &'static str,
	pub body: String,
}
impl Reply {
	pub fn form(body: &str) -> Self {
		Self { status: 200, content_type: FORM, body: body.to_owned() }
	}

	pub fn not_found() -> Self {
		Self { status: 404, content_type: "text/plain", body: String::new() }
	}
}

/// Request as seen by a [`RoutedHttpClient`].
#[derive(Clone, Debug)]
pub struct Seen {
	pub path: String,
	pub authorization: Option<String>,
	pub form: BTreeMap<String, String>,
}

type Handler = dyn Fn(&Seen) -> Reply + Send + Sync;

/// HTTP client double that answers every request through a handler, the way a mock round
/// tripper would.
#[derive(Clone)]
pub struct RoutedHttpClient {
	handler: Arc<Handler>,
	seen: Arc<Mutex<Vec<Seen>>>,
}
impl RoutedHttpClient {
	pub fn new<F>(handler: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&Seen) -> Reply,
	{
		Self { handler: Arc::new(handler), seen: Arc::default() }
	}

	pub fn seen(&self) -> Vec<Seen> {
		self.seen.lock().expect("Request log should not be poisoned.").clone()
	}
}
impl TokenHttpClient for RoutedHttpClient {
	type Handle = RoutedHttpClient;
	type TransportError = std::io::Error;

	fn handle(&self) -> Self::Handle {
		self.clone()
	}
}
impl<'c> AsyncHttpClient<'c> for RoutedHttpClient {
	type Error = HttpClientError<std::io::Error>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let seen = Seen {
			path: request.uri().path().to_owned(),
			authorization: request
				.headers()
				.get("authorization")
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned),
			form: form_urlencoded::parse(request.body()).into_owned().collect(),
		};
		let reply = (self.handler)(&seen);

		self.seen.lock().expect("Request log should not be poisoned.").push(seen);

		Box::pin(async move {
			let mut response = HttpResponse::new(reply.body.into_bytes());

			*response.status_mut() =
				StatusCode::from_u16(reply.status).expect("Handler status should be valid.");
			response.headers_mut().insert(
				CONTENT_TYPE,
				reply.content_type.parse().expect("Handler content type should be valid."),
			);

			Ok(response)
		})
	}
}

//! Pluggable OAuth 2.0 provider registry: named provider families, tenant-aware endpoint
//! templates, and one shared token-endpoint executor behind public and private operation views.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod context;
pub mod error;
pub mod http;
mod oauth;
pub mod obs;
pub mod provider;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::{
		collections::VecDeque,
		sync::{Mutex, PoisonError},
	};
	// crates.io
	use oauth2::{
		AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
		http::{StatusCode, header::CONTENT_TYPE},
	};
	// self
	#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
	use crate::http::TokenHttpClient;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	#[cfg(feature = "reqwest")]
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Request captured by [`ScriptedHttpClient`].
	#[derive(Clone, Debug)]
	pub struct RecordedRequest {
		/// HTTP method.
		pub method: String,
		/// Target URI.
		pub uri: String,
		/// Headers with lowercase names.
		pub headers: BTreeMap<String, String>,
		/// Raw body.
		pub body: Vec<u8>,
	}
	impl RecordedRequest {
		/// Decodes the form-encoded body.
		pub fn form(&self) -> BTreeMap<String, String> {
			url::form_urlencoded::parse(&self.body).into_owned().collect()
		}

		/// Looks up a header by lowercase name.
		pub fn header(&self, name: &str) -> Option<&str> {
			self.headers.get(name).map(String::as_str)
		}
	}

	#[derive(Debug)]
	enum Scripted {
		Respond(HttpResponse),
		Pending,
		Fail(String),
	}

	#[derive(Debug, Default)]
	struct ScriptState {
		responses: VecDeque<Scripted>,
		requests: Vec<RecordedRequest>,
	}

	/// In-process [`TokenHttpClient`] that records requests and replays queued answers.
	///
	/// Clones share state, so a test can keep one handle for assertions after moving another
	/// into a [`Context`](crate::context::Context). Requests without a queued answer receive an
	/// empty 404.
	#[derive(Clone, Debug, Default)]
	pub struct ScriptedHttpClient {
		state: Arc<Mutex<ScriptState>>,
	}
	impl ScriptedHttpClient {
		/// Queues a response with an optional content type.
		pub fn push_response(&self, status: u16, content_type: Option<&str>, body: &str) {
			let mut response = HttpResponse::new(body.as_bytes().to_vec());

			*response.status_mut() =
				StatusCode::from_u16(status).expect("Scripted status must be valid.");

			if let Some(value) = content_type {
				response
					.headers_mut()
					.insert(CONTENT_TYPE, value.parse().expect("Scripted content type must be valid."));
			}

			self.push(Scripted::Respond(response));
		}

		/// Queues a form-encoded response.
		pub fn push_form(&self, status: u16, body: &str) {
			self.push_response(status, Some("application/x-www-form-urlencoded"), body);
		}

		/// Queues a JSON response.
		pub fn push_json(&self, status: u16, body: &str) {
			self.push_response(status, Some("application/json"), body);
		}

		/// Queues a request that never completes.
		pub fn push_pending(&self) {
			self.push(Scripted::Pending);
		}

		/// Queues a transport failure.
		pub fn push_failure(&self, message: impl Into<String>) {
			self.push(Scripted::Fail(message.into()));
		}

		/// Requests observed so far, oldest first.
		pub fn requests(&self) -> Vec<RecordedRequest> {
			self.lock().requests.clone()
		}

		fn push(&self, scripted: Scripted) {
			self.lock().responses.push_back(scripted);
		}

		fn lock(&self) -> std::sync::MutexGuard<'_, ScriptState> {
			self.state.lock().unwrap_or_else(PoisonError::into_inner)
		}
	}
	impl TokenHttpClient for ScriptedHttpClient {
		type Handle = ScriptedHttpClient;
		type TransportError = std::io::Error;

		fn handle(&self) -> Self::Handle {
			self.clone()
		}
	}
	impl<'c> AsyncHttpClient<'c> for ScriptedHttpClient {
		type Error = HttpClientError<std::io::Error>;
		type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

		fn call(&'c self, request: HttpRequest) -> Self::Future {
			let next = {
				let mut state = self.lock();

				state.requests.push(RecordedRequest {
					method: request.method().to_string(),
					uri: request.uri().to_string(),
					headers: request
						.headers()
						.iter()
						.filter_map(|(name, value)| {
							value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
						})
						.collect(),
					body: request.body().clone(),
				});
				state.responses.pop_front()
			};

			Box::pin(async move {
				match next {
					Some(Scripted::Respond(response)) => Ok(response),
					Some(Scripted::Pending) => std::future::pending().await,
					Some(Scripted::Fail(message)) => Err(HttpClientError::Other(message)),
					None => {
						let mut response = HttpResponse::new(Vec::new());

						*response.status_mut() = StatusCode::NOT_FOUND;

						Ok(response)
					},
				}
			})
		}
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;

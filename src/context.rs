//! Per-call execution context: injected HTTP client, cancellation, and deadline.

// crates.io
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use crate::{_prelude::*, error::TransportError, http::TokenHttpClient};

/// Carries everything a token operation needs from its caller besides the request itself.
///
/// Cancellation is cooperative: when the token fires or the deadline passes, the in-flight
/// request future is dropped and the operation fails with
/// [`TransportError::Cancelled`] or [`TransportError::DeadlineExceeded`]. Deadlines rely on
/// the tokio timer, so operations must run inside a tokio runtime.
pub struct Context<C>
where
	C: TokenHttpClient,
{
	/// HTTP client used for every outbound request issued under this context.
	pub http_client: Arc<C>,
	cancellation: Option<CancellationToken>,
	deadline: Option<Instant>,
}
impl<C> Context<C>
where
	C: TokenHttpClient,
{
	/// Creates a context without cancellation or deadline.
	pub fn new(http_client: impl Into<Arc<C>>) -> Self {
		Self { http_client: http_client.into(), cancellation: None, deadline: None }
	}

	/// Aborts in-flight requests once `token` is cancelled.
	pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
		self.cancellation = Some(token);

		self
	}

	/// Sets an absolute deadline.
	pub fn with_deadline(mut self, deadline: Instant) -> Self {
		self.deadline = Some(deadline);

		self
	}

	/// Sets a deadline relative to now.
	pub fn with_timeout(self, timeout: std::time::Duration) -> Self {
		self.with_deadline(Instant::now() + timeout)
	}

	/// Returns the configured deadline, if any.
	pub fn deadline(&self) -> Option<Instant> {
		self.deadline
	}

	/// Returns `true` once the cancellation token has fired.
	pub fn is_cancelled(&self) -> bool {
		self.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled)
	}

	/// Drives `fut` to completion unless the context is cancelled or its deadline elapses first.
	pub(crate) async fn run<F>(&self, fut: F) -> Result<F::Output, TransportError>
	where
		F: Future,
	{
		let bounded = async {
			match self.deadline {
				Some(deadline) => tokio::time::timeout_at(deadline, fut)
					.await
					.map_err(TransportError::DeadlineExceeded),
				None => Ok(fut.await),
			}
		};

		match &self.cancellation {
			Some(token) => tokio::select! {
				biased;

				_ = token.cancelled() => Err(TransportError::Cancelled),
				result = bounded => result,
			},
			None => bounded.await,
		}
	}
}
impl<C> Clone for Context<C>
where
	C: TokenHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: Arc::clone(&self.http_client),
			cancellation: self.cancellation.clone(),
			deadline: self.deadline,
		}
	}
}
#[cfg(feature = "reqwest")]
impl Default for Context<ReqwestHttpClient> {
	fn default() -> Self {
		Self::new(ReqwestHttpClient::default())
	}
}
impl<C> Debug for Context<C>
where
	C: TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Context")
			.field("cancellable", &self.cancellation.is_some())
			.field("deadline", &self.deadline)
			.finish()
	}
}

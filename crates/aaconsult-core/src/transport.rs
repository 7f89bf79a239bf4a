//! The `Transport` trait — how a contact request leaves the process.
//!
//! Implemented by `aaconsult-client` over HTTP. The flow depends on this
//! abstraction only, so tests can swap in fakes that record the body or fail
//! on demand.

use std::{future::Future, sync::Arc};

/// What a transport reports once a round trip finishes.
///
/// The response body is never read; only the status is kept, and only
/// [`SuccessPolicy::Strict`](crate::flow::SuccessPolicy::Strict) looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
  pub status: u16,
}

impl Completion {
  pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }
}

/// Send a JSON document and observe whether the round trip completed.
///
/// An `Err` means the call itself failed (connection refused, DNS, TLS,
/// timeout). A server answering with an error status is still `Ok`.
pub trait Transport: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// `POST` `body` to `path` with `Content-Type: application/json`.
  fn post_json<'a>(
    &'a self,
    path: &'a str,
    body: String,
  ) -> impl Future<Output = Result<Completion, Self::Error>> + Send + 'a;
}

impl<T: Transport> Transport for Arc<T> {
  type Error = T::Error;

  fn post_json<'a>(
    &'a self,
    path: &'a str,
    body: String,
  ) -> impl Future<Output = Result<Completion, Self::Error>> + Send + 'a {
    (**self).post_json(path, body)
  }
}

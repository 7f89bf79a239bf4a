//! The contact-request flow: validate, submit, and track the outcome.
//!
//! One [`ContactRequestFlow`] exists per product view. Its outcome only ever
//! moves forward:
//!
//! ```text
//! Idle --begin()--> Pending --settle()--> Succeeded | Failed
//! ```
//!
//! Both settled states are terminal. A visitor who wants to try again gets a
//! new flow instance by opening the product again.

use strum::Display;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  contact::{ContactFormInput, ContactRequest, Field},
  transport::{Completion, Transport},
  validate::{ValidationResult, validate},
};

/// Path the contact request is posted to, relative to the server base URL.
pub const REQUEST_PATH: &str = "/request";

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// Where a flow instance is in its single submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum RequestOutcome {
  /// Form is editable; nothing has been sent.
  #[default]
  Idle,
  /// A request is in flight. The form is shown but locked.
  Pending,
  /// The round trip completed.
  Succeeded,
  /// The transport failed (or, under the strict policy, the server refused).
  Failed,
}

impl RequestOutcome {
  pub fn is_settled(self) -> bool {
    matches!(self, Self::Succeeded | Self::Failed)
  }

  /// `Idle` and `Pending` both render the form.
  pub fn shows_form(self) -> bool { matches!(self, Self::Idle | Self::Pending) }

  pub fn is_editable(self) -> bool { matches!(self, Self::Idle) }
}

// ─── Success policy ──────────────────────────────────────────────────────────

/// How a completed round trip maps onto an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SuccessPolicy {
  /// Any completed round trip is a success, whatever the status code.
  #[default]
  Coarse,
  /// Only a 2xx status is a success.
  Strict,
}

impl SuccessPolicy {
  pub fn outcome(self, completion: Completion) -> RequestOutcome {
    match self {
      Self::Coarse => RequestOutcome::Succeeded,
      Self::Strict if completion.is_success() => RequestOutcome::Succeeded,
      Self::Strict => RequestOutcome::Failed,
    }
  }
}

// ─── Submission ──────────────────────────────────────────────────────────────

/// Send an already-validated request and report how it settled.
///
/// Always returns [`RequestOutcome::Succeeded`] or [`RequestOutcome::Failed`].
/// Transport errors are logged and collapsed into `Failed`.
pub async fn deliver<T: Transport>(
  transport: &T,
  request: &ContactRequest,
  policy: SuccessPolicy,
) -> RequestOutcome {
  let file_id = request.file_id;
  let body = match request.to_json() {
    Ok(body) => body,
    Err(e) => {
      warn!(file_id, error = %e, "could not serialise contact request");
      return RequestOutcome::Failed;
    }
  };

  debug!(file_id, %policy, "sending contact request");
  match transport.post_json(REQUEST_PATH, body).await {
    Ok(completion) => {
      let outcome = policy.outcome(completion);
      info!(file_id, status = completion.status, %outcome, "contact request settled");
      outcome
    }
    Err(e) => {
      warn!(file_id, error = %e, "contact request failed");
      RequestOutcome::Failed
    }
  }
}

/// Validate `input` and, if it passes, submit it for `product_id` under the
/// default (coarse) policy.
///
/// Invalid input never reaches the transport.
pub async fn submit<T: Transport>(
  transport: &T,
  product_id: i64,
  input: &ContactFormInput,
) -> Result<RequestOutcome> {
  validate(input).map_err(Error::Validation)?;
  let request = ContactRequest::new(product_id, input);
  Ok(deliver(transport, &request, SuccessPolicy::default()).await)
}

// ─── Flow ────────────────────────────────────────────────────────────────────

/// One contact form bound to one product.
#[derive(Debug, Clone)]
pub struct ContactRequestFlow {
  product_id: i64,
  input:      ContactFormInput,
  outcome:    RequestOutcome,
  policy:     SuccessPolicy,
}

impl ContactRequestFlow {
  /// A fresh, empty, idle form for `product_id`.
  pub fn new(product_id: i64) -> Self {
    Self {
      product_id,
      input: ContactFormInput::default(),
      outcome: RequestOutcome::Idle,
      policy: SuccessPolicy::default(),
    }
  }

  pub fn with_policy(mut self, policy: SuccessPolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn product_id(&self) -> i64 { self.product_id }

  pub fn input(&self) -> &ContactFormInput { &self.input }

  pub fn outcome(&self) -> RequestOutcome { self.outcome }

  pub fn policy(&self) -> SuccessPolicy { self.policy }

  /// Mutable access to one field. Only allowed while idle.
  pub fn edit(&mut self, field: Field) -> Result<&mut String> {
    if !self.outcome.is_editable() {
      return Err(Error::ReadOnly(self.outcome));
    }
    Ok(self.input.get_mut(field))
  }

  /// Replace one field's value. Only allowed while idle.
  pub fn set(&mut self, field: Field, value: impl Into<String>) -> Result<()> {
    *self.edit(field)? = value.into();
    Ok(())
  }

  pub fn validate(&self) -> ValidationResult { validate(&self.input) }

  /// Validate and move to `Pending`, returning the request to deliver.
  ///
  /// On validation failure the flow stays `Idle` and the per-field errors are
  /// returned in [`Error::Validation`].
  pub fn begin(&mut self) -> Result<ContactRequest> {
    if self.outcome != RequestOutcome::Idle {
      return Err(Error::NotIdle(self.outcome));
    }
    self.validate().map_err(Error::Validation)?;
    self.outcome = RequestOutcome::Pending;
    debug!(product_id = self.product_id, "contact request pending");
    Ok(ContactRequest::new(self.product_id, &self.input))
  }

  /// Record how the in-flight request ended.
  pub fn settle(&mut self, outcome: RequestOutcome) -> Result<()> {
    if self.outcome != RequestOutcome::Pending {
      return Err(Error::NotPending(self.outcome));
    }
    if !outcome.is_settled() {
      return Err(Error::Unsettled(outcome));
    }
    self.outcome = outcome;
    Ok(())
  }

  /// [`begin`](Self::begin), deliver through `transport`, then
  /// [`settle`](Self::settle).
  pub async fn run<T: Transport>(
    &mut self,
    transport: &T,
  ) -> Result<RequestOutcome> {
    let request = self.begin()?;
    let outcome = deliver(transport, &request, self.policy).await;
    self.settle(outcome)?;
    Ok(outcome)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use super::*;

  // ─── Fakes ─────────────────────────────────────────────────────────────────

  #[derive(Debug, thiserror::Error)]
  #[error("connection refused")]
  struct Refused;

  /// Records every call; answers with `status`, or fails when `status` is
  /// `None`.
  #[derive(Default)]
  struct FakeTransport {
    status: Option<u16>,
    calls:  Mutex<Vec<(String, String)>>,
  }

  impl FakeTransport {
    fn answering(status: u16) -> Self {
      Self {
        status: Some(status),
        ..Default::default()
      }
    }

    fn failing() -> Self { Self::default() }

    fn calls(&self) -> Vec<(String, String)> {
      self.calls.lock().unwrap().clone()
    }
  }

  impl Transport for FakeTransport {
    type Error = Refused;

    fn post_json<'a>(
      &'a self,
      path: &'a str,
      body: String,
    ) -> impl Future<Output = Result<Completion, Refused>> + Send + 'a {
      async move {
        self.calls.lock().unwrap().push((path.to_string(), body));
        self.status.map(|status| Completion { status }).ok_or(Refused)
      }
    }
  }

  fn valid_input() -> ContactFormInput {
    ContactFormInput::new(
      "ValidName1",
      "user@example.com",
      "This is a valid message.",
    )
  }

  fn filled_flow(product_id: i64) -> ContactRequestFlow {
    let mut flow = ContactRequestFlow::new(product_id);
    let input = valid_input();
    flow.set(Field::Name, input.name).unwrap();
    flow.set(Field::Email, input.email).unwrap();
    flow.set(Field::Message, input.message).unwrap();
    flow
  }

  // ─── submit ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn submit_succeeds_on_completed_round_trip() {
    let t = FakeTransport::answering(200);
    let outcome = submit(&t, 42, &valid_input()).await.unwrap();
    assert_eq!(outcome, RequestOutcome::Succeeded);
  }

  #[tokio::test]
  async fn submit_ignores_error_status_by_default() {
    for status in [400, 404, 500, 503] {
      let t = FakeTransport::answering(status);
      let outcome = submit(&t, 42, &valid_input()).await.unwrap();
      assert_eq!(outcome, RequestOutcome::Succeeded, "status {status}");
    }
  }

  #[tokio::test]
  async fn submit_fails_when_transport_errors() {
    let t = FakeTransport::failing();
    let outcome = submit(&t, 42, &valid_input()).await.unwrap();
    assert_eq!(outcome, RequestOutcome::Failed);
  }

  #[tokio::test]
  async fn submit_sends_exactly_one_request_with_the_body() {
    let t = FakeTransport::answering(204);
    submit(&t, 42, &valid_input()).await.unwrap();
    assert_eq!(
      t.calls(),
      vec![(
        "/request".to_string(),
        r#"{"fileId":42,"name":"ValidName1","email":"user@example.com","message":"This is a valid message."}"#
          .to_string(),
      )]
    );
  }

  #[tokio::test]
  async fn submit_rejects_invalid_input_without_sending() {
    let t = FakeTransport::answering(200);
    let input = ContactFormInput::new("short", "a@b", "hi");
    let err = submit(&t, 42, &input).await.unwrap_err();
    match err {
      Error::Validation(errs) => assert_eq!(errs.len(), 3),
      other => panic!("expected validation error, got {other:?}"),
    }
    assert!(t.calls().is_empty());
  }

  #[tokio::test]
  async fn strict_policy_checks_status() {
    let request = ContactRequest::new(1, &valid_input());
    let ok = FakeTransport::answering(201);
    let err = FakeTransport::answering(500);
    assert_eq!(
      deliver(&ok, &request, SuccessPolicy::Strict).await,
      RequestOutcome::Succeeded
    );
    assert_eq!(
      deliver(&err, &request, SuccessPolicy::Strict).await,
      RequestOutcome::Failed
    );
  }

  // ─── State machine ─────────────────────────────────────────────────────────

  #[test]
  fn successful_flow_visits_every_state_in_order() {
    let mut flow = filled_flow(42);
    assert_eq!(flow.outcome(), RequestOutcome::Idle);

    let request = flow.begin().unwrap();
    assert_eq!(request.file_id, 42);
    assert_eq!(flow.outcome(), RequestOutcome::Pending);

    flow.settle(RequestOutcome::Succeeded).unwrap();
    assert_eq!(flow.outcome(), RequestOutcome::Succeeded);

    assert!(matches!(
      flow.begin(),
      Err(Error::NotIdle(RequestOutcome::Succeeded))
    ));
    assert_eq!(flow.outcome(), RequestOutcome::Succeeded);
  }

  #[test]
  fn invalid_form_stays_idle() {
    let mut flow = ContactRequestFlow::new(3);
    flow.set(Field::Name, "ValidName1").unwrap();
    let err = flow.begin().unwrap_err();
    match err {
      Error::Validation(errs) => {
        assert!(!errs.contains(Field::Name));
        assert!(errs.contains(Field::Email));
        assert!(errs.contains(Field::Message));
      }
      other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(flow.outcome(), RequestOutcome::Idle);
  }

  #[test]
  fn pending_blocks_resubmission_and_edits() {
    let mut flow = filled_flow(1);
    flow.begin().unwrap();
    assert!(matches!(
      flow.begin(),
      Err(Error::NotIdle(RequestOutcome::Pending))
    ));
    assert!(matches!(
      flow.set(Field::Name, "Someone Else"),
      Err(Error::ReadOnly(RequestOutcome::Pending))
    ));
    assert_eq!(flow.input().name, "ValidName1");
  }

  #[test]
  fn settle_requires_pending_and_a_settled_outcome() {
    let mut flow = filled_flow(1);
    assert!(matches!(
      flow.settle(RequestOutcome::Succeeded),
      Err(Error::NotPending(RequestOutcome::Idle))
    ));

    flow.begin().unwrap();
    assert!(matches!(
      flow.settle(RequestOutcome::Idle),
      Err(Error::Unsettled(RequestOutcome::Idle))
    ));
    flow.settle(RequestOutcome::Failed).unwrap();

    assert!(matches!(
      flow.settle(RequestOutcome::Succeeded),
      Err(Error::NotPending(RequestOutcome::Failed))
    ));
    assert_eq!(flow.outcome(), RequestOutcome::Failed);
  }

  #[tokio::test]
  async fn run_settles_through_the_transport() {
    let t = Arc::new(FakeTransport::answering(500));
    let mut flow = filled_flow(7);
    assert_eq!(flow.run(&t).await.unwrap(), RequestOutcome::Succeeded);
    assert_eq!(flow.outcome(), RequestOutcome::Succeeded);
    assert_eq!(t.calls().len(), 1);

    let mut strict = filled_flow(7).with_policy(SuccessPolicy::Strict);
    assert_eq!(strict.run(&t).await.unwrap(), RequestOutcome::Failed);
    assert!(strict.run(&t).await.is_err());
    assert_eq!(t.calls().len(), 2);
  }

  #[tokio::test]
  async fn run_reports_transport_failure() {
    let t = FakeTransport::failing();
    let mut flow = filled_flow(7);
    assert_eq!(flow.run(&t).await.unwrap(), RequestOutcome::Failed);
    assert!(flow.set(Field::Message, "edited after failure").is_err());
  }

  #[test]
  fn outcome_rendering_rules() {
    use RequestOutcome::*;
    assert!(Idle.shows_form() && Pending.shows_form());
    assert!(!Succeeded.shows_form() && !Failed.shows_form());
    assert!(Idle.is_editable() && !Pending.is_editable());
    assert_eq!(Pending.to_string(), "pending");
  }
}

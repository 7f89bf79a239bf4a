//! Contact form state for one product view.
//!
//! Wraps a [`ContactRequestFlow`] with what the terminal needs on top of it:
//! which field has focus, the inline errors from the last submit attempt, and
//! the channel the background delivery task reports back on.

use std::sync::Arc;

use aaconsult_core::{
  Error,
  contact::Field,
  flow::{ContactRequestFlow, RequestOutcome, SuccessPolicy, deliver},
  transport::Transport,
  validate::ValidationErrors,
};
use tokio::sync::oneshot::{self, error::TryRecvError};

pub const INTRO: &str =
  "If you would like access to this file, please contact us using the form below:";

pub const SUCCESS_MESSAGE: &str =
  "The form was sent and recorded successfully!";

pub const FAILURE_MESSAGE: &str = "Something went wrong while processing the \
                                   form. Please try again later, or contact \
                                   us by email if the problem persists.";

/// Result of pressing submit.
#[derive(Debug, PartialEq, Eq)]
pub enum Submit {
  /// Delivery task spawned; the flow is pending.
  Sent,
  /// At least one field failed validation; see [`ContactForm::errors`].
  Invalid,
  /// The form has already been submitted.
  Ignored,
}

#[derive(Debug)]
pub struct ContactForm {
  pub flow:   ContactRequestFlow,
  pub focus:  Field,
  pub errors: ValidationErrors,
  pending:    Option<oneshot::Receiver<RequestOutcome>>,
}

impl ContactForm {
  pub fn new(product_id: i64, policy: SuccessPolicy) -> Self {
    Self {
      flow:    ContactRequestFlow::new(product_id).with_policy(policy),
      focus:   Field::Name,
      errors:  ValidationErrors::default(),
      pending: None,
    }
  }

  pub fn outcome(&self) -> RequestOutcome { self.flow.outcome() }

  pub fn focus_next(&mut self) { self.focus = self.focus.next(); }

  pub fn focus_prev(&mut self) { self.focus = self.focus.prev(); }

  /// Append `c` to the focused field. No-op unless the form is idle.
  pub fn type_char(&mut self, c: char) {
    if let Ok(value) = self.flow.edit(self.focus) {
      value.push(c);
      self.errors.clear(self.focus);
    }
  }

  /// Delete the last character of the focused field.
  pub fn backspace(&mut self) {
    if let Ok(value) = self.flow.edit(self.focus) {
      value.pop();
      self.errors.clear(self.focus);
    }
  }

  /// Validate and, if the form is valid, deliver it on a background task.
  ///
  /// Call [`poll`](Self::poll) from the event loop to pick up the result.
  pub fn submit<T>(&mut self, transport: Arc<T>) -> Submit
  where
    T: Transport + 'static,
  {
    let request = match self.flow.begin() {
      Ok(request) => request,
      Err(Error::Validation(errors)) => {
        // Focus the first broken field.
        if let Some((field, _)) = errors.iter().next() {
          self.focus = field;
        }
        self.errors = errors;
        return Submit::Invalid;
      }
      Err(_) => return Submit::Ignored,
    };

    self.errors = ValidationErrors::default();
    let policy = self.flow.policy();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let outcome = deliver(&transport, &request, policy).await;
      // The receiver only goes away if the app is shutting down.
      let _ = tx.send(outcome);
    });
    self.pending = Some(rx);
    Submit::Sent
  }

  /// Settle the flow if the delivery task has finished. Returns `true` when
  /// the outcome changed.
  pub fn poll(&mut self) -> bool {
    let Some(rx) = self.pending.as_mut() else {
      return false;
    };
    let outcome = match rx.try_recv() {
      Ok(outcome) => outcome,
      Err(TryRecvError::Empty) => return false,
      // The task died without reporting; treat it like a transport failure.
      Err(TryRecvError::Closed) => RequestOutcome::Failed,
    };
    self.pending = None;
    self.flow.settle(outcome).is_ok()
  }
}

//! Error types for `aaconsult-core`.

use thiserror::Error;

use crate::{flow::RequestOutcome, validate::ValidationErrors};

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid contact form: {0}")]
  Validation(ValidationErrors),

  #[error("cannot submit: request is {0}")]
  NotIdle(RequestOutcome),

  #[error("cannot settle: request is {0}, not pending")]
  NotPending(RequestOutcome),

  #[error("{0} is not a settled outcome")]
  Unsettled(RequestOutcome),

  #[error("form is read-only while the request is {0}")]
  ReadOnly(RequestOutcome),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Contact form input and the request body it becomes.

use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator};
use validator::Validate;

// ─── Fields ──────────────────────────────────────────────────────────────────

/// A user-editable field of the contact form, in form order.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Display,
  EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum Field {
  Name,
  Email,
  Message,
}

impl Field {
  /// All fields in form order.
  pub fn all() -> impl Iterator<Item = Field> { Field::iter() }

  /// Capitalised label for messages and the form UI.
  pub fn label(self) -> &'static str {
    match self {
      Field::Name => "Name",
      Field::Email => "Email",
      Field::Message => "Message",
    }
  }

  /// The next field, wrapping from the last back to the first.
  pub fn next(self) -> Field {
    match self {
      Field::Name => Field::Email,
      Field::Email => Field::Message,
      Field::Message => Field::Name,
    }
  }

  /// The previous field, wrapping from the first to the last.
  pub fn prev(self) -> Field {
    match self {
      Field::Name => Field::Message,
      Field::Email => Field::Name,
      Field::Message => Field::Email,
    }
  }
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// What the visitor typed. Starts empty and is edited one field at a time.
///
/// The rules are checked through [`crate::validate::validate`], which turns
/// the derived report into per-field messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ContactFormInput {
  #[validate(
    custom(function = "crate::validate::required", message = "Name is required"),
    length(min = 8, max = 30, message = "Name must be between 8 and 30 characters")
  )]
  pub name:    String,
  #[validate(regex(path = *crate::validate::EMAIL_RE, message = "Email invalid"))]
  pub email:   String,
  #[validate(
    custom(function = "crate::validate::required", message = "Message is required"),
    length(
      min = 10,
      max = 1000,
      message = "Message must be between 10 and 1000 characters"
    )
  )]
  pub message: String,
}

impl ContactFormInput {
  pub fn new(
    name: impl Into<String>,
    email: impl Into<String>,
    message: impl Into<String>,
  ) -> Self {
    Self {
      name:    name.into(),
      email:   email.into(),
      message: message.into(),
    }
  }

  pub fn get(&self, field: Field) -> &str {
    match field {
      Field::Name => &self.name,
      Field::Email => &self.email,
      Field::Message => &self.message,
    }
  }

  pub fn get_mut(&mut self, field: Field) -> &mut String {
    match field {
      Field::Name => &mut self.name,
      Field::Email => &mut self.email,
      Field::Message => &mut self.message,
    }
  }
}

// ─── Outbound body ───────────────────────────────────────────────────────────

/// JSON body of `POST /request`.
///
/// Field order is part of the wire format: `fileId`, `name`, `email`,
/// `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
  pub file_id: i64,
  pub name:    String,
  pub email:   String,
  pub message: String,
}

impl ContactRequest {
  pub fn new(file_id: i64, input: &ContactFormInput) -> Self {
    Self {
      file_id,
      name: input.name.clone(),
      email: input.email.clone(),
      message: input.message.clone(),
    }
  }

  pub fn to_json(&self) -> crate::Result<String> {
    Ok(serde_json::to_string(self)?)
  }
}

//! Contact form validation.
//!
//! | Field     | Rule                                   |
//! |-----------|----------------------------------------|
//! | `name`    | required, 8–30 characters              |
//! | `email`   | required, matches [`EMAIL_PATTERN`]    |
//! | `message` | required, 10–1000 characters           |
//!
//! The rules themselves are `#[validate(..)]` attributes on
//! [`ContactFormInput`]; this module owns the email pattern and folds the
//! derived report into one message per field. Lengths count Unicode scalar
//! values, not bytes.

use std::{collections::BTreeMap, fmt, ops::RangeInclusive, sync::LazyLock};

use regex::Regex;
use validator::{Validate, ValidationError};

use crate::contact::{ContactFormInput, Field};

pub const NAME_LENGTH: RangeInclusive<usize> = 8..=30;
pub const MESSAGE_LENGTH: RangeInclusive<usize> = 10..=1000;

/// The only custom message; the other fields report their length bounds.
pub const EMAIL_INVALID: &str = "Email invalid";

/// Local part of dot-separated atoms or a quoted string, then either a
/// bracketed IPv4-style literal or dotted labels ending in a 2+ letter TLD.
///
/// Whitespace is spelled out rather than written `\s` so that it covers
/// exactly U+FEFF and the ECMAScript line terminators, and nothing else
/// (no U+0085). Quoted local parts may not contain line terminators. Letters
/// are ASCII in both cases; no Unicode case folding applies.
pub const EMAIL_PATTERN: &str = r#"^(([^<>()\[\]\\.,;:\t\n\x0B\x0C\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}@"]+(\.[^<>()\[\]\\.,;:\t\n\x0B\x0C\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}@"]+)*)|("[^\n\r\x{2028}\x{2029}]+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z0-9-]+\.)+[a-zA-Z]{2,}))$"#;

pub(crate) static EMAIL_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"));

/// Rejects the empty string so it gets its own message instead of the
/// length bounds.
pub(crate) fn required(value: &str) -> Result<(), ValidationError> {
  if value.is_empty() {
    return Err(ValidationError::new("required"));
  }
  Ok(())
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Per-field messages for every field that failed, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
  pub fn get(&self, field: Field) -> Option<&str> {
    self.0.get(&field).map(String::as_str)
  }

  pub fn contains(&self, field: Field) -> bool { self.0.contains_key(&field) }

  pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
    self.0.iter().map(|(f, m)| (*f, m.as_str()))
  }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Drop the message for `field`, e.g. once the user edits it again.
  pub fn clear(&mut self, field: Field) { self.0.remove(&field); }
}

impl From<validator::ValidationErrors> for ValidationErrors {
  /// One message per field. An empty value reports `required` even though
  /// it also fails its length rule.
  fn from(errors: validator::ValidationErrors) -> Self {
    let by_field = errors.field_errors();
    let mut out = BTreeMap::new();

    for field in Field::all() {
      let key = field.to_string();
      let Some(list) = by_field.get(key.as_str()) else {
        continue;
      };
      let Some(error) = list
        .iter()
        .find(|e| e.code == "required")
        .or_else(|| list.first())
      else {
        continue;
      };
      let message = match &error.message {
        _ if error.code == "required" => format!("{} is required", field.label()),
        Some(message) => message.to_string(),
        None => format!("{} is invalid", field.label()),
      };
      out.insert(field, message);
    }

    Self(out)
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for (field, message) in self.iter() {
      if !first {
        f.write_str("; ")?;
      }
      write!(f, "{field}: {message}")?;
      first = false;
    }
    Ok(())
  }
}

/// `Ok(())` when every field passes.
pub type ValidationResult = Result<(), ValidationErrors>;

// ─── Rules ───────────────────────────────────────────────────────────────────

/// Check every field of `input`. All failures are reported together.
pub fn validate(input: &ContactFormInput) -> ValidationResult {
  input.validate().map_err(ValidationErrors::from)
}

/// Whether `value` looks like an email address. Case does not matter.
pub fn is_valid_email(value: &str) -> bool { EMAIL_RE.is_match(value) }

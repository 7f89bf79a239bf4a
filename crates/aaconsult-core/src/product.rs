//! Product — one downloadable Excel file in the catalog.
//!
//! Products are read-only here: the server owns them, the client fetches them
//! at render time and discards them on navigation.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The prefix every catalog video link starts with.
pub const YOUTUBE_WATCH_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Origin passed to the embedded player.
pub const EMBED_ORIGIN: &str = "https://aaconsl.com";

/// A catalog entry as served by `/excel/` and `/excel/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id:          i64,
  pub name:        String,
  pub summary:     String,
  pub description: String,
  #[serde(deserialize_with = "deserialize_date")]
  pub date:        DateTime<Utc>,
  pub youtube_url: String,
}

impl Product {
  /// The YouTube video id, i.e. the watch URL with its prefix removed.
  ///
  /// Links that do not use the watch form are returned unchanged.
  pub fn video_id(&self) -> &str {
    self
      .youtube_url
      .strip_prefix(YOUTUBE_WATCH_PREFIX)
      .unwrap_or(&self.youtube_url)
  }

  pub fn thumbnail_url(&self) -> String {
    format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", self.video_id())
  }

  pub fn embed_url(&self) -> String {
    format!(
      "https://www.youtube.com/embed/{}?origin={EMBED_ORIGIN}",
      self.video_id()
    )
  }

  /// Path of the product's detail page.
  pub fn detail_path(&self) -> String { format!("/excel/{}", self.id) }

  /// Publication date in the `dd.mm.yyyy` form used across the site.
  pub fn display_date(&self) -> String {
    self.date.format("%d.%m.%Y").to_string()
  }
}

// ─── Dates ───────────────────────────────────────────────────────────────────

/// Parse a catalog timestamp.
///
/// RFC 3339 is preferred. Timestamps without an offset (`2022-03-14T09:26:53`
/// or with a space separator) and bare dates are read as UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
    return Some(date.with_timezone(&Utc));
  }
  for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
      return Some(naive.and_utc());
    }
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|naive| naive.and_utc())
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = String::deserialize(deserializer)?;
  parse_date(&raw).ok_or_else(|| {
    serde::de::Error::custom(format!("unrecognised product date {raw:?}"))
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn product(youtube_url: &str) -> Product {
    serde_json::from_value(serde_json::json!({
      "id": 7,
      "name": "Stocuri",
      "summary": "Gestiune stocuri",
      "description": "Fișier pentru gestiunea stocurilor.",
      "date": "2022-03-14T09:26:53Z",
      "youtubeUrl": youtube_url,
    }))
    .expect("valid product json")
  }

  #[test]
  fn deserialises_camel_case_fields() {
    let p = product("https://www.youtube.com/watch?v=abc123");
    assert_eq!(p.id, 7);
    assert_eq!(p.youtube_url, "https://www.youtube.com/watch?v=abc123");
    assert_eq!(p.date.to_rfc3339(), "2022-03-14T09:26:53+00:00");
  }

  #[test]
  fn video_links_derive_from_watch_url() {
    let p = product("https://www.youtube.com/watch?v=abc123");
    assert_eq!(p.video_id(), "abc123");
    assert_eq!(
      p.thumbnail_url(),
      "https://i.ytimg.com/vi/abc123/hqdefault.jpg"
    );
    assert_eq!(
      p.embed_url(),
      "https://www.youtube.com/embed/abc123?origin=https://aaconsl.com"
    );
  }

  #[test]
  fn non_watch_url_is_left_alone() {
    let p = product("https://youtu.be/abc123");
    assert_eq!(p.video_id(), "https://youtu.be/abc123");
  }

  #[test]
  fn display_date_and_path() {
    let p = product("");
    assert_eq!(p.display_date(), "14.03.2022");
    assert_eq!(p.detail_path(), "/excel/7");
  }

  fn with_date(date: &str) -> serde_json::Result<Product> {
    serde_json::from_value(serde_json::json!({
      "id": 1,
      "name": "n",
      "summary": "s",
      "description": "d",
      "date": date,
      "youtubeUrl": "",
    }))
  }

  #[test]
  fn dates_without_offset_are_read_as_utc() {
    for raw in [
      "2022-03-14T09:26:53",
      "2022-03-14T09:26:53.000",
      "2022-03-14 09:26:53",
      "2022-03-14T11:26:53+02:00",
    ] {
      let p = with_date(raw).expect(raw);
      assert_eq!(p.date.to_rfc3339(), "2022-03-14T09:26:53+00:00", "{raw}");
    }
    let p = with_date("2022-03-14").unwrap();
    assert_eq!(p.display_date(), "14.03.2022");
  }

  #[test]
  fn garbage_date_is_rejected() {
    let err = with_date("yesterday").unwrap_err();
    assert!(err.to_string().contains("yesterday"), "{err}");
  }
}

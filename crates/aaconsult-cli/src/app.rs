//! Application state machine and event dispatcher.

use std::sync::Arc;

use aaconsult_client::ApiClient;
use aaconsult_core::{
  catalog::{self, FEATURED_COUNT},
  flow::{RequestOutcome, SuccessPolicy},
  product::Product,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use tracing::warn;

use crate::form::{ContactForm, Submit};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the product list; right pane shows the selection, if any.
  ProductList,
  /// Focus on the product detail pane.
  ProductDetail,
  /// Contact form for the selected product.
  ContactForm,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// The catalog, newest first.
  pub products: Vec<Product>,

  /// Show only the newest few products, like the home page.
  pub featured_only: bool,

  /// Current fuzzy-filter string (only active when `filter_active`).
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Cursor position within the *visible* product list.
  pub list_cursor: usize,

  /// Scroll offset within the detail pane.
  pub detail_scroll: usize,

  /// The product opened in the detail pane, as fetched from `/excel/{id}`.
  pub selected: Option<Product>,

  /// Contact form for `selected`. Replaced with a fresh one on every open.
  pub form: Option<ContactForm>,

  /// How contact requests decide success.
  pub policy: SuccessPolicy,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,
}

impl App {
  /// Create an [`App`] with an empty catalog.
  pub fn new(client: ApiClient, policy: SuccessPolicy) -> Self {
    Self {
      screen: Screen::ProductList,
      products: Vec::new(),
      featured_only: false,
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      detail_scroll: 0,
      selected: None,
      form: None,
      policy,
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch the catalog and populate `self.products`, newest first.
  pub async fn load_products(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading catalog…".into();
    match self.client.list_products().await {
      Ok(mut products) => {
        catalog::sort_newest_first(&mut products);
        self.products = products;
        self.list_cursor = 0;
        self.status_msg = String::new();
        Ok(())
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        Err(e.into())
      }
    }
  }

  /// Fetch a single product into `self.selected`.
  async fn load_product(&mut self, id: i64) -> anyhow::Result<()> {
    self.status_msg = "Loading…".into();
    match self.client.get_product(id).await {
      Ok(product) => {
        self.selected = Some(product);
        self.detail_scroll = 0;
        self.status_msg = String::new();
        Ok(())
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        Err(e.into())
      }
    }
  }

  // ── Visible list ──────────────────────────────────────────────────────────

  /// Products that pass the featured toggle and the current filter query.
  pub fn visible_products(&self) -> Vec<&Product> {
    let limit = if self.featured_only {
      FEATURED_COUNT
    } else {
      usize::MAX
    };
    let base = self.products.iter().take(limit);
    if self.filter.is_empty() {
      return base.collect();
    }
    let matcher = SkimMatcherV2::default();
    base
      .filter(|p| {
        matcher.fuzzy_match(&p.name, &self.filter).is_some()
          || matcher.fuzzy_match(&p.summary, &self.filter).is_some()
      })
      .collect()
  }

  /// The product under the list cursor in the visible list, if any.
  pub fn cursor_product(&self) -> Option<&Product> {
    self.visible_products().get(self.list_cursor).copied()
  }

  // ── Background work ───────────────────────────────────────────────────────

  /// Pick up a finished contact request, if there is one.
  pub fn tick(&mut self) {
    if let Some(form) = self.form.as_mut()
      && form.poll()
    {
      self.status_msg = match form.outcome() {
        RequestOutcome::Succeeded => "Request sent.".into(),
        _ => "Request failed.".into(),
      };
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
    // Global: Ctrl-C quits from anywhere, unless a request is in flight.
    if key.modifiers.contains(KeyModifiers::CONTROL)
      && key.code == KeyCode::Char('c')
    {
      if self.request_pending() {
        self.status_msg = "Waiting for the server…".into();
        return true;
      }
      return false;
    }

    if self.filter_active {
      return self.handle_filter_key(key).await;
    }

    match self.screen {
      Screen::ProductList => self.handle_list_key(key).await,
      Screen::ProductDetail => self.handle_detail_key(key).await,
      Screen::ContactForm => self.handle_form_key(key),
    }
  }

  /// Whether a contact request has been sent and not yet answered.
  pub fn request_pending(&self) -> bool {
    self
      .form
      .as_ref()
      .is_some_and(|form| form.outcome() == RequestOutcome::Pending)
  }

  async fn handle_filter_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.list_cursor = 0;
        // Immediately open detail if there's exactly one match.
        let only = match self.visible_products().as_slice() {
          [p] => Some(p.id),
          _ => None,
        };
        if let Some(id) = only {
          self.open_detail(id).await;
        }
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
    true
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.visible_products().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = self.cursor_product().map(|p| p.id) {
          self.open_detail(id).await;
        }
      }

      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }

      KeyCode::Char('f') => {
        self.featured_only = !self.featured_only;
        self.list_cursor = 0;
      }

      _ => {}
    }
    true
  }

  async fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => self.close_detail(),

      KeyCode::Down | KeyCode::Char('j') => self.detail_scroll += 1,
      KeyCode::Up | KeyCode::Char('k') => {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
      }

      KeyCode::Char('c') | KeyCode::Enter => self.open_form(),

      // Quick switching between products from the detail pane.
      KeyCode::Char(']') | KeyCode::PageDown => {
        let len = self.visible_products().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
          if let Some(id) = self.cursor_product().map(|p| p.id) {
            self.open_detail(id).await;
          }
        }
      }
      KeyCode::Char('[') | KeyCode::PageUp => {
        if self.list_cursor > 0 {
          self.list_cursor -= 1;
          if let Some(id) = self.cursor_product().map(|p| p.id) {
            self.open_detail(id).await;
          }
        }
      }

      _ => {}
    }
    true
  }

  fn handle_form_key(&mut self, key: KeyEvent) -> bool {
    let Some(form) = self.form.as_mut() else {
      self.screen = Screen::ProductDetail;
      return true;
    };

    match key.code {
      KeyCode::Esc => {
        if form.outcome() == RequestOutcome::Pending {
          self.status_msg = "Waiting for the server…".into();
        } else {
          self.form = None;
          self.screen = Screen::ProductDetail;
          self.status_msg = String::new();
        }
      }
      KeyCode::Tab | KeyCode::Down => form.focus_next(),
      KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
      KeyCode::Backspace => form.backspace(),
      KeyCode::Enter => {
        self.status_msg = match form.submit(Arc::clone(&self.client)) {
          Submit::Sent => "Sending…".into(),
          Submit::Invalid => "Please fix the highlighted fields.".into(),
          Submit::Ignored => return true,
        };
      }
      KeyCode::Char(c) => form.type_char(c),
      _ => {}
    }
    true
  }

  /// Transition to `ProductDetail` for `id`, fetching the product.
  ///
  /// A failed fetch leaves the screen as it was; the error stays in the
  /// status bar.
  async fn open_detail(&mut self, id: i64) {
    if let Err(e) = self.load_product(id).await {
      warn!(id, error = %e, "could not load product");
      return;
    }
    self.form = None;
    self.screen = Screen::ProductDetail;
  }

  fn close_detail(&mut self) {
    self.screen = Screen::ProductList;
    self.selected = None;
    self.form = None;
  }

  /// Open a fresh contact form for the selected product.
  fn open_form(&mut self) {
    if let Some(product) = &self.selected {
      self.form = Some(ContactForm::new(product.id, self.policy));
      self.screen = Screen::ContactForm;
      self.status_msg = String::new();
    }
  }
}

#[cfg(test)]
mod tests {
  use aaconsult_client::ApiConfig;
  use aaconsult_core::contact::Field;
  use chrono::{TimeZone, Utc};

  use super::*;

  fn product(id: i64, name: &str) -> Product {
    Product {
      id,
      name: name.into(),
      summary: format!("summary of {name}"),
      description: String::new(),
      date: Utc.timestamp_opt(1_600_000_000 - id, 0).unwrap(),
      youtube_url: String::new(),
    }
  }

  fn app() -> App {
    let client = ApiClient::new(ApiConfig {
      base_url: "http://127.0.0.1:9".into(),
      ..Default::default()
    })
    .unwrap();
    let mut app = App::new(client, SuccessPolicy::Coarse);
    app.products = vec![
      product(1, "Facturare"),
      product(2, "Stocuri"),
      product(3, "Salarii"),
      product(4, "Pontaj"),
      product(5, "Bugetare"),
    ];
    app
  }

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[tokio::test]
  async fn featured_toggle_limits_the_list() {
    let mut app = app();
    assert_eq!(app.visible_products().len(), 5);
    app.handle_key(key(KeyCode::Char('f'))).await;
    assert!(app.featured_only);
    assert_eq!(app.visible_products().len(), FEATURED_COUNT);
  }

  #[tokio::test]
  async fn filter_narrows_by_name() {
    let mut app = app();
    app.handle_key(key(KeyCode::Char('/'))).await;
    for c in "stoc".chars() {
      app.handle_key(key(KeyCode::Char(c))).await;
    }
    let names: Vec<_> =
      app.visible_products().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Stocuri"]);

    app.handle_key(key(KeyCode::Esc)).await;
    assert!(app.filter.is_empty());
    assert_eq!(app.visible_products().len(), 5);
  }

  #[tokio::test]
  async fn cursor_stays_in_bounds() {
    let mut app = app();
    app.handle_key(key(KeyCode::Up)).await;
    assert_eq!(app.list_cursor, 0);
    for _ in 0..10 {
      app.handle_key(key(KeyCode::Char('j'))).await;
    }
    assert_eq!(app.list_cursor, 4);
    assert_eq!(app.cursor_product().map(|p| p.id), Some(5));
  }

  #[tokio::test]
  async fn contact_form_opens_fresh_and_closes() {
    let mut app = app();
    app.selected = Some(product(2, "Stocuri"));
    app.screen = Screen::ProductDetail;

    app.handle_key(key(KeyCode::Char('c'))).await;
    assert_eq!(app.screen, Screen::ContactForm);
    for c in "Ana".chars() {
      app.handle_key(key(KeyCode::Char(c))).await;
    }
    let form = app.form.as_ref().unwrap();
    assert_eq!(form.flow.product_id(), 2);
    assert_eq!(form.flow.input().name, "Ana");

    // Typing 'q' in the form edits the field rather than quitting.
    assert!(app.handle_key(key(KeyCode::Char('q'))).await);

    app.handle_key(key(KeyCode::Esc)).await;
    assert_eq!(app.screen, Screen::ProductDetail);
    assert!(app.form.is_none());

    app.handle_key(key(KeyCode::Char('c'))).await;
    assert!(app.form.as_ref().unwrap().flow.input().name.is_empty());
  }

  #[tokio::test]
  async fn invalid_submit_stays_on_the_form() {
    let mut app = app();
    app.selected = Some(product(1, "Facturare"));
    app.screen = Screen::ProductDetail;
    app.handle_key(key(KeyCode::Char('c'))).await;

    app.handle_key(key(KeyCode::Enter)).await;
    let form = app.form.as_ref().unwrap();
    assert_eq!(form.outcome(), RequestOutcome::Idle);
    assert_eq!(form.errors.len(), 3);
    assert_eq!(app.status_msg, "Please fix the highlighted fields.");
  }

  #[tokio::test]
  async fn ctrl_c_quits_from_the_form() {
    let mut app = app();
    app.selected = Some(product(1, "Facturare"));
    app.screen = Screen::ProductDetail;
    app.handle_key(key(KeyCode::Char('c'))).await;

    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert!(!app.handle_key(ctrl_c).await);
  }

  #[tokio::test]
  async fn ctrl_c_waits_for_a_pending_request() {
    let mut app = app();
    app.selected = Some(product(1, "Facturare"));
    app.screen = Screen::ProductDetail;
    app.handle_key(key(KeyCode::Char('c'))).await;

    let form = app.form.as_mut().unwrap();
    form.flow.set(Field::Name, "ValidName1").unwrap();
    form.flow.set(Field::Email, "user@example.com").unwrap();
    form.flow.set(Field::Message, "This is a valid message.").unwrap();
    form.flow.begin().unwrap();
    assert!(app.request_pending());

    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert!(app.handle_key(ctrl_c).await);
    assert_eq!(app.screen, Screen::ContactForm);
    assert_eq!(app.status_msg, "Waiting for the server…");

    app
      .form
      .as_mut()
      .unwrap()
      .flow
      .settle(RequestOutcome::Failed)
      .unwrap();
    assert!(!app.handle_key(ctrl_c).await);
  }

  #[tokio::test]
  async fn failed_product_fetch_keeps_the_browser_open() {
    // Bind and drop to get a port nothing listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
      .unwrap()
      .local_addr()
      .unwrap()
      .port();
    let client = ApiClient::new(ApiConfig {
      base_url: format!("http://127.0.0.1:{port}"),
      ..Default::default()
    })
    .unwrap();
    let mut app = App::new(client, SuccessPolicy::Coarse);
    app.products = vec![product(1, "Facturare")];

    assert!(app.handle_key(key(KeyCode::Enter)).await);
    assert_eq!(app.screen, Screen::ProductList);
    assert!(app.selected.is_none());
    assert!(app.status_msg.starts_with("Error:"), "{}", app.status_msg);
  }
}

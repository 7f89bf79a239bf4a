//! Contact form pane — right panel while requesting a file.

use aaconsult_core::{contact::Field, flow::RequestOutcome};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::{
  app::App,
  form::{ContactForm, FAILURE_MESSAGE, INTRO, SUCCESS_MESSAGE},
};

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the contact form (or its settled message) into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let (Some(product), Some(form)) = (&app.selected, &app.form) else {
    return;
  };

  let block = Block::default()
    .title(format!(" Request · {} ", product.name))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Gray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  match form.outcome() {
    RequestOutcome::Idle | RequestOutcome::Pending => draw_fields(f, inner, form),
    RequestOutcome::Succeeded => draw_message(
      f,
      inner,
      SUCCESS_MESSAGE,
      Style::default().fg(Color::Green),
    ),
    RequestOutcome::Failed => {
      draw_message(f, inner, FAILURE_MESSAGE, Style::default().fg(Color::Red))
    }
  }
}

// ─── Fields ───────────────────────────────────────────────────────────────────

fn draw_fields(f: &mut Frame, area: Rect, form: &ContactForm) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(2), // intro
      Constraint::Length(3), // name
      Constraint::Length(1),
      Constraint::Length(3), // email
      Constraint::Length(1),
      Constraint::Min(4), // message
      Constraint::Length(1),
    ])
    .split(area);

  f.render_widget(
    Paragraph::new(INTRO).wrap(Wrap { trim: true }),
    rows[0],
  );

  for (field, input_row, error_row) in [
    (Field::Name, rows[1], rows[2]),
    (Field::Email, rows[3], rows[4]),
    (Field::Message, rows[5], rows[6]),
  ] {
    draw_field(f, input_row, error_row, form, field);
  }

  if form.outcome() == RequestOutcome::Pending {
    draw_overlay(f, area);
  }
}

fn draw_field(
  f: &mut Frame,
  input_area: Rect,
  error_area: Rect,
  form: &ContactForm,
  field: Field,
) {
  let focused = form.focus == field && form.outcome().is_editable();
  let error = form.errors.get(field);

  let border = match (error, focused) {
    (Some(_), _) => Color::Red,
    (None, true) => Color::Yellow,
    (None, false) => Color::DarkGray,
  };

  let mut value = form.flow.input().get(field).to_string();
  if focused {
    value.push('_');
  }

  let block = Block::default()
    .title(format!(" {} ", field.label()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));
  f.render_widget(
    Paragraph::new(value).block(block).wrap(Wrap { trim: false }),
    input_area,
  );

  if let Some(message) = error {
    f.render_widget(
      Paragraph::new(Line::from(Span::styled(
        format!(" {message}"),
        Style::default().fg(Color::Red),
      ))),
      error_area,
    );
  }
}

/// Loading overlay drawn over the locked form.
fn draw_overlay(f: &mut Frame, area: Rect) {
  let width = area.width.min(24);
  let height = area.height.min(3);
  let overlay = Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  };
  f.render_widget(Clear, overlay);
  f.render_widget(
    Paragraph::new(Line::from(Span::styled(
      "Sending…",
      Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD),
    )))
    .centered()
    .block(Block::default().borders(Borders::ALL)),
    overlay,
  );
}

fn draw_message(f: &mut Frame, area: Rect, message: &str, style: Style) {
  f.render_widget(
    Paragraph::new(message).style(style).wrap(Wrap { trim: true }),
    area,
  );
}

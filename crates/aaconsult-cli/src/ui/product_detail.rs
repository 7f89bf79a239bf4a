//! Product detail pane — right panel.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

/// Render the selected product into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(product) = &app.selected else {
    return;
  };

  let block = Block::default()
    .title(format!(" {} ", product.name))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Gray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let label = Style::default()
    .fg(Color::Cyan)
    .add_modifier(Modifier::BOLD);
  let dim = Style::default().fg(Color::DarkGray);

  let mut lines = vec![
    Line::from(vec![
      Span::styled(format!("{:<10}", "published"), label),
      Span::raw(product.display_date()),
    ]),
    Line::from(vec![
      Span::styled(format!("{:<10}", "summary"), label),
      Span::raw(product.summary.clone()),
    ]),
    Line::from(""),
  ];

  // Descriptions carry their own line breaks.
  lines.extend(product.description.lines().map(|l| Line::from(l.to_string())));

  lines.push(Line::from(""));
  lines.push(Line::from(vec![
    Span::styled(format!("{:<10}", "video"), label),
    Span::raw(product.embed_url()),
  ]));
  lines.push(Line::from(vec![
    Span::styled(format!("{:<10}", "thumbnail"), label),
    Span::styled(product.thumbnail_url(), dim),
  ]));
  lines.push(Line::from(vec![
    Span::styled(format!("{:<10}", "page"), label),
    Span::styled(product.detail_path(), dim),
  ]));

  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    "To receive this file, press [c] and send us a request.",
    Style::default().fg(Color::Yellow),
  )));

  let para = Paragraph::new(lines)
    .wrap(Wrap { trim: false })
    .scroll((app.detail_scroll as u16, 0));
  f.render_widget(para, inner);
}

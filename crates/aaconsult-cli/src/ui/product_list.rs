//! Product list pane — left panel.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, Screen};

/// Render the product list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let visible = app.visible_products();
  let total = app.products.len();

  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" Files ({}/{}) ", visible.len(), total)
  } else if app.featured_only {
    format!(" Featured ({}) ", visible.len())
  } else {
    format!(" Files ({total}) ")
  };

  // Dim the border when focus is on the right pane.
  let border = if app.screen == Screen::ProductList {
    Color::Gray
  } else {
    Color::DarkGray
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let items: Vec<ListItem> = visible
    .iter()
    .map(|product| {
      ListItem::new(vec![
        Line::from(vec![
          Span::styled(
            product.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
          ),
          Span::styled(
            format!("  {}", product.display_date()),
            Style::default().fg(Color::Magenta),
          ),
        ]),
        Line::from(Span::styled(
          product.summary.clone(),
          Style::default().fg(Color::DarkGray),
        )),
      ])
    })
    .collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Filter bar along the bottom edge of the pane.
  if (app.filter_active || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let filter_text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  let mut state = ListState::default();
  state.select(if visible.is_empty() {
    None
  } else {
    Some(app.list_cursor)
  });

  f.render_stateful_widget(
    List::new(items)
      .highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("▌"),
    inner_area,
    &mut state,
  );
}

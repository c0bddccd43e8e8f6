use crate::grid::{ActiveFilters, Column};
use crate::ui::renderfns::truncate;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Longest summary shown per filter
const MAX_SUMMARY: usize = 30;

/// "Header: summary" label per active filter, in the order they were added
pub fn filter_labels(filters: &ActiveFilters, columns: &[Column]) -> Vec<String> {
  filters
    .iter()
    .map(|f| {
      let header = columns
        .iter()
        .find(|c| c.key == f.column)
        .map_or(f.column.as_str(), |c| c.header);
      format!("{}: {}", header, truncate(&f.criterion.summary(), MAX_SUMMARY))
    })
    .collect()
}

/// One-line bar listing the active column filters. Draws nothing when no
/// filter is active.
pub fn render_filter_bar(frame: &mut Frame, area: Rect, filters: &ActiveFilters, columns: &[Column]) {
  if filters.is_empty() || area.height == 0 {
    return;
  }

  let mut spans = vec![Span::styled(
    "[Filters] ",
    Style::default().fg(Color::Yellow),
  )];
  for (idx, label) in filter_labels(filters, columns).into_iter().enumerate() {
    if idx > 0 {
      spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
    }
    spans.push(Span::styled(
      label,
      Style::default().fg(Color::Black).bg(Color::Cyan),
    ));
  }
  spans.push(Span::styled(
    "   F clear all",
    Style::default().fg(Color::DarkGray),
  ));

  frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

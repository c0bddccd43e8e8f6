use crate::ui::view::{Notification, NotificationLevel};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer bar: view breadcrumb on the left, latest notification on
/// the right
pub fn draw_footer(
  frame: &mut Frame,
  area: Rect,
  breadcrumb: &[String],
  notification: Option<&Notification>,
) {
  let mut spans = vec![Span::raw(" ")];

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i == breadcrumb.len() - 1 {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    spans.push(Span::styled(part.clone(), style));
  }

  let chunks = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(area);

  let left = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(left, chunks[0]);

  let right = match notification {
    Some(n) => {
      let color = match n.level {
        NotificationLevel::Info => Color::Green,
        NotificationLevel::Error => Color::Red,
      };
      Paragraph::new(Line::styled(
        format!("{} ", n.message),
        Style::default().fg(color),
      ))
    }
    None => Paragraph::new(""),
  };
  frame.render_widget(
    right
      .alignment(Alignment::Right)
      .style(Style::default().bg(Color::Black)),
    chunks[1],
  );
}

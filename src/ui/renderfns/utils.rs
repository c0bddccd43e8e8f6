use ratatui::prelude::Color;

/// Truncate to at most `max_len` characters, ending in "..." when cut
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Display color for status-like cells (lead, SOW, partner and employee
/// statuses, opportunity stages)
pub fn status_color(status: &str) -> Color {
  match status {
    "Active" | "Completed" | "Won" | "Closed Won" | "Converted" | "Qualified" => Color::Green,
    "Delayed" | "On Hold" | "Pending" | "In Progress" | "Negotiation" => Color::Yellow,
    "Rejected" | "Lost" | "Closed Lost" | "Inactive" | "Cancelled" | "Terminated" => Color::Red,
    _ => Color::White,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("Acme", 10), "Acme");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("Acme", 4), "Acme");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("North America", 8), "North...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("Zürich Österreich", 9), "Zürich...");
  }

  #[test]
  fn test_status_colors() {
    assert_eq!(status_color("Active"), Color::Green);
    assert_eq!(status_color("Won"), Color::Green);
    assert_eq!(status_color("On Hold"), Color::Yellow);
    assert_eq!(status_color("Lost"), Color::Red);
    assert_eq!(status_color("New"), Color::White);
  }
}

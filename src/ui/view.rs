use crate::crm::EntityKind;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use std::time::{Duration, Instant};

/// How long a notification stays in the footer
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
  Info,
  Error,
}

/// Transient message shown in the footer
#[derive(Debug, Clone)]
pub struct Notification {
  pub level: NotificationLevel,
  pub message: String,
  pub at: Instant,
}

impl Notification {
  pub fn info(message: impl Into<String>) -> Self {
    Self {
      level: NotificationLevel::Info,
      message: message.into(),
      at: Instant::now(),
    }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self {
      level: NotificationLevel::Error,
      message: message.into(),
      at: Instant::now(),
    }
  }

  pub fn is_expired(&self) -> bool {
    self.at.elapsed() >= NOTIFICATION_TTL
  }
}

/// Actions that a view can request in response to user input
pub enum ViewAction {
  /// No action needed
  None,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop current view from stack (go back)
  Pop,
}

/// Trait for view behavior
///
/// Views handle their own input modes (search, filters, confirmation) and
/// return actions for the App to execute: App → View → Components.
///
/// Views that load data asynchronously should use Query<T> internally and
/// poll it in the tick() method.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Get the breadcrumb label for this view
  fn breadcrumb_label(&self) -> String;

  /// Entity shown by this view (for header display)
  fn entity(&self) -> Option<EntityKind> {
    None
  }

  /// Called on each tick to allow views to poll async queries
  fn tick(&mut self) {}

  /// True while a text box or modal owns the keyboard, so global keys
  /// like `:` reach the view instead of the app
  fn captures_input(&self) -> bool {
    false
  }

  /// Hand over the latest message for the footer, if any
  fn take_notification(&mut self) -> Option<Notification> {
    None
  }

  /// Get keyboard shortcuts to display in the header
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}

/// What a component did with a key.
///
/// Components hand this back to their view so the view decides whether to
/// act on an event, stop, or try its own bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Key was consumed, nothing for the view to do
  Handled,
  /// Key was consumed and produced an event for the view
  Event(T),
  /// Key was not consumed, the view should try its own bindings
  NotHandled,
}

impl<T> KeyResult<T> {
  /// Whether the component swallowed the key
  pub fn is_consumed(&self) -> bool {
    !matches!(self, KeyResult::NotHandled)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_is_consumed() {
    assert!(KeyResult::<()>::Handled.is_consumed());
    assert!(KeyResult::Event(1).is_consumed());
    assert!(!KeyResult::<()>::NotHandled.is_consumed());
  }
}

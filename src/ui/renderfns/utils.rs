use ratatui::prelude::Color;
use tfdash::remote::{ChangeAction, ProjectStatus};

/// Truncate a string to a maximum number of characters, adding "..." if
/// truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Get the display color for a project status
pub fn status_color(status: ProjectStatus) -> Color {
  match status {
    ProjectStatus::Ok => Color::Green,
    ProjectStatus::Error => Color::Red,
    ProjectStatus::Pending => Color::Yellow,
  }
}

/// Get the display color for a planned resource change
pub fn change_color(action: &ChangeAction) -> Color {
  match action {
    ChangeAction::Create => Color::Green,
    ChangeAction::Update => Color::Yellow,
    ChangeAction::Recreate | ChangeAction::Destroy => Color::Red,
    ChangeAction::Other(_) => Color::White,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("módulo_principal", 8), "módul...");
  }

  #[test]
  fn test_status_color() {
    assert_eq!(status_color(ProjectStatus::Ok), Color::Green);
    assert_eq!(status_color(ProjectStatus::Error), Color::Red);
    assert_eq!(status_color(ProjectStatus::Pending), Color::Yellow);
  }

  #[test]
  fn test_change_color() {
    assert_eq!(change_color(&ChangeAction::Destroy), Color::Red);
    assert_eq!(change_color(&ChangeAction::Other("Read".into())), Color::White);
  }
}

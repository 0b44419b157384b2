use super::KeyResult;
use crate::store::types::ROLES;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

/// Events emitted by the role picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolePickerEvent {
  /// Role chosen; the empty string is the "no filter" sentinel
  Selected(String),
  /// Picker dismissed without choosing
  Cancelled,
}

/// Centered overlay for choosing a role, used both for the list's
/// categorical filter (with a "Clear Filter" entry) and the add form's
/// role field (roles only).
#[derive(Debug, Clone, Default)]
pub struct RolePicker {
  active: bool,
  with_clear_entry: bool,
  selected: usize,
  title: String,
}

impl RolePicker {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Show the picker. `with_clear_entry` appends the match-all sentinel.
  pub fn show(&mut self, title: impl Into<String>, with_clear_entry: bool) {
    self.active = true;
    self.with_clear_entry = with_clear_entry;
    self.selected = 0;
    self.title = title.into();
  }

  fn hide(&mut self) {
    self.active = false;
    self.selected = 0;
  }

  fn entry_count(&self) -> usize {
    ROLES.len() + usize::from(self.with_clear_entry)
  }

  /// The role string an entry index stands for
  fn entry_value(&self, index: usize) -> String {
    ROLES.get(index).map(|r| r.to_string()).unwrap_or_default()
  }

  /// Handle a key event
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<RolePickerEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(RolePickerEvent::Cancelled)
      }
      KeyCode::Enter => {
        let value = self.entry_value(self.selected);
        self.hide();
        KeyResult::Event(RolePickerEvent::Selected(value))
      }
      KeyCode::Char('j') | KeyCode::Down => {
        self.selected = (self.selected + 1) % self.entry_count();
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.selected = if self.selected == 0 {
          self.entry_count() - 1
        } else {
          self.selected - 1
        };
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  /// Render the picker overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let max_name_len = ROLES.iter().map(|r| r.len()).max().unwrap_or(10);
    let width = (max_name_len as u16 + 6).min(area.width.saturating_sub(4)).max(20);
    let height = (self.entry_count() as u16 + 2).min(area.height.saturating_sub(4)).max(3);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", self.title));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let mut items: Vec<ListItem> = ROLES
      .iter()
      .map(|role| ListItem::new(Line::from(Span::styled(*role, Style::default().fg(Color::Cyan)))))
      .collect();
    if self.with_clear_entry {
      items.push(ListItem::new(Line::from(Span::styled(
        "Clear Filter",
        Style::default().fg(Color::DarkGray),
      ))));
    }

    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(self.selected));

    frame.render_stateful_widget(list, inner, &mut state);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_select_first_role() {
    let mut picker = RolePicker::new();
    picker.show("Filter by role", true);

    assert_eq!(
      picker.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(RolePickerEvent::Selected("Frontend".to_string()))
    );
    assert!(!picker.is_active());
  }

  #[test]
  fn test_clear_entry_yields_sentinel() {
    let mut picker = RolePicker::new();
    picker.show("Filter by role", true);

    // Move past every role to the trailing "Clear Filter" entry
    for _ in 0..ROLES.len() {
      picker.handle_key(key(KeyCode::Char('j')));
    }
    assert_eq!(
      picker.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(RolePickerEvent::Selected(String::new()))
    );
  }

  #[test]
  fn test_form_variant_wraps_within_roles() {
    let mut picker = RolePicker::new();
    picker.show("Select Role", false);

    picker.handle_key(key(KeyCode::Char('k')));
    assert_eq!(
      picker.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(RolePickerEvent::Selected("Testing".to_string()))
    );
  }

  #[test]
  fn test_escape_cancels() {
    let mut picker = RolePicker::new();
    picker.show("Filter by role", true);
    assert_eq!(
      picker.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(RolePickerEvent::Cancelled)
    );
  }

  #[test]
  fn test_inactive_passes_keys_through() {
    let mut picker = RolePicker::new();
    assert_eq!(picker.handle_key(key(KeyCode::Enter)), KeyResult::NotHandled);
  }
}

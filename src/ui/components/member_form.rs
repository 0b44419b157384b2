use super::input::{InputResult, TextInput};
use super::role_picker::{RolePicker, RolePickerEvent};
use super::KeyResult;
use crate::store::types::NewMember;
use crate::validate::{self, Draft, Field, ValidationErrors};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by the add-member form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
  /// Draft passed validation; the parent runs the add mutation. The form
  /// stays open until the parent reports success via `reset()`.
  Submitted(NewMember),
  /// Form dismissed; entered values are retained for reopening
  Cancelled,
}

/// Fields in focus order
const FIELDS: &[Field] = &[
  Field::FirstName,
  Field::LastName,
  Field::Email,
  Field::Avatar,
  Field::Role,
  Field::Salary,
];

/// Modal form for creating a record. Validation runs on submit; an invalid
/// draft shows inline errors and never leaves the form.
#[derive(Debug, Default)]
pub struct MemberForm {
  active: bool,
  focused: usize,
  first_name: TextInput,
  last_name: TextInput,
  email: TextInput,
  avatar: TextInput,
  salary: TextInput,
  role: String,
  role_picker: RolePicker,
  errors: ValidationErrors,
}

impl MemberForm {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Open the form. Previously entered values are kept so a failed
  /// submission can be retried.
  pub fn open(&mut self) {
    self.active = true;
    self.focused = 0;
  }

  /// Close and clear all fields. Called after a successful add.
  pub fn reset(&mut self) {
    *self = Self::default();
  }

  fn draft(&self) -> Draft {
    Draft {
      first_name: self.first_name.value().to_string(),
      last_name: self.last_name.value().to_string(),
      email: self.email.value().to_string(),
      avatar: self.avatar.value().to_string(),
      role: self.role.clone(),
      salary: self.salary.value().to_string(),
    }
  }

  fn focused_field(&self) -> Field {
    FIELDS[self.focused.min(FIELDS.len() - 1)]
  }

  fn focused_input(&mut self) -> Option<&mut TextInput> {
    match self.focused_field() {
      Field::FirstName => Some(&mut self.first_name),
      Field::LastName => Some(&mut self.last_name),
      Field::Email => Some(&mut self.email),
      Field::Avatar => Some(&mut self.avatar),
      Field::Role => None,
      Field::Salary => Some(&mut self.salary),
    }
  }

  fn focus_next(&mut self) {
    self.focused = (self.focused + 1) % FIELDS.len();
  }

  fn focus_previous(&mut self) {
    self.focused = if self.focused == 0 {
      FIELDS.len() - 1
    } else {
      self.focused - 1
    };
  }

  fn submit(&mut self) -> KeyResult<FormEvent> {
    match validate::validate(&self.draft()) {
      Ok(member) => {
        self.errors = ValidationErrors::default();
        KeyResult::Event(FormEvent::Submitted(member))
      }
      Err(errors) => {
        // Submission blocked; the store is never called for an invalid draft
        self.errors = errors;
        KeyResult::Handled
      }
    }
  }

  /// Handle a key event while the form is open
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    // Role picker overlay takes precedence while it is up
    match self.role_picker.handle_key(key) {
      KeyResult::Event(RolePickerEvent::Selected(role)) => {
        self.role = role;
        self.focus_next();
        return KeyResult::Handled;
      }
      KeyResult::Event(RolePickerEvent::Cancelled) | KeyResult::Handled => {
        return KeyResult::Handled;
      }
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Tab | KeyCode::Down => {
        self.focus_next();
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focus_previous();
        return KeyResult::Handled;
      }
      _ => {}
    }

    if self.focused_field() == Field::Role {
      return match key.code {
        KeyCode::Enter => {
          self.role_picker.show("Select Role", false);
          KeyResult::Handled
        }
        KeyCode::Esc => {
          self.active = false;
          KeyResult::Event(FormEvent::Cancelled)
        }
        _ => KeyResult::Handled,
      };
    }

    let on_last_field = self.focused == FIELDS.len() - 1;
    match self.focused_input() {
      Some(input) => match input.handle_key(key) {
        InputResult::Submitted(_) => {
          // Enter advances; on the last field it submits the draft
          if on_last_field {
            self.submit()
          } else {
            self.focus_next();
            KeyResult::Handled
          }
        }
        InputResult::Cancelled => {
          self.active = false;
          KeyResult::Event(FormEvent::Cancelled)
        }
        InputResult::Consumed | InputResult::NotHandled => KeyResult::Handled,
      },
      None => KeyResult::Handled,
    }
  }

  fn field_value(&self, field: Field) -> &str {
    match field {
      Field::FirstName => self.first_name.value(),
      Field::LastName => self.last_name.value(),
      Field::Email => self.email.value(),
      Field::Avatar => self.avatar.value(),
      Field::Role => {
        if self.role.is_empty() {
          "Select Role"
        } else {
          &self.role
        }
      }
      Field::Salary => self.salary.value(),
    }
  }

  /// Render the form modal if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (area.width * 70 / 100).clamp(40, 70);
    let height = (FIELDS.len() as u16 * 2 + 3).min(area.height.saturating_sub(2));

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Magenta))
      .title(" Add New Member ");

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let mut lines = Vec::new();
    for (i, field) in FIELDS.iter().enumerate() {
      let focused = i == self.focused && !self.role_picker.is_active();
      let label_style = if focused {
        Style::default().fg(Color::Magenta).bold()
      } else {
        Style::default().fg(Color::DarkGray)
      };

      let mut spans = vec![
        Span::styled(format!("{:<12}", field.label()), label_style),
        Span::raw(self.field_value(*field).to_string()),
      ];
      if focused && *field != Field::Role {
        spans.push(Span::styled("_", Style::default().fg(Color::Magenta)));
      }
      lines.push(Line::from(spans));

      match self.errors.message_for(*field) {
        Some(message) => lines.push(Line::from(Span::styled(
          format!("            {}", message),
          Style::default().fg(Color::Red),
        ))),
        None => lines.push(Line::default()),
      }
    }
    lines.push(Line::from(Span::styled(
      "Tab next field   Enter on Salary submits   Esc cancel",
      Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
    self.role_picker.render_overlay(frame, area);
  }
}

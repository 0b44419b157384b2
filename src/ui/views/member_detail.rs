use crate::cache::{SharedQueryCache, USERS_KEY};
use crate::notify::{Notification, Notifier};
use crate::query::{Mutation, Query, QueryState};
use crate::salary::{self, SalaryAction};
use crate::store::client::StoreClient;
use crate::store::types::{Member, NewMember};
use crate::ui::components::{InputResult, TextInput};
use crate::ui::renderfns::{format_salary, role_color};
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Focusable inputs while editing, in cycle order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditFocus {
  FirstName,
  LastName,
  Email,
  Amount,
}

impl EditFocus {
  fn next(self) -> Self {
    match self {
      EditFocus::FirstName => EditFocus::LastName,
      EditFocus::LastName => EditFocus::Email,
      EditFocus::Email => EditFocus::Amount,
      EditFocus::Amount => EditFocus::FirstName,
    }
  }

  fn previous(self) -> Self {
    match self {
      EditFocus::FirstName => EditFocus::Amount,
      EditFocus::LastName => EditFocus::FirstName,
      EditFocus::Email => EditFocus::LastName,
      EditFocus::Amount => EditFocus::Email,
    }
  }
}

/// The unsaved edit state: a field draft plus the separately tracked
/// salary, adjusted only through the reducer. Avatar and role are carried
/// through unchanged; edit applies no per-field validation.
#[derive(Debug, Default)]
struct EditDraft {
  first_name: TextInput,
  last_name: TextInput,
  email: TextInput,
  /// Working salary value, the source of truth while editing
  salary: u64,
  /// Transient adjustment amount; never persisted
  amount: TextInput,
  focus: Option<EditFocus>,
}

impl EditDraft {
  /// Seed (or re-seed) every field from the persisted record. Cancel is
  /// exactly this: the draft collapses back to what the store holds.
  fn seed(&mut self, member: &Member) {
    self.first_name.set_value(&member.first_name);
    self.last_name.set_value(&member.last_name);
    self.email.set_value(&member.email);
    self.salary = member.salary;
    self.amount.clear();
    self.focus = Some(EditFocus::FirstName);
  }

  /// Whether the +/- controls are enabled (amount parses as positive)
  fn amount_value(&self) -> Option<u64> {
    salary::parse_amount(self.amount.value())
  }

  /// Apply an adjustment if the amount input allows one
  fn adjust(&mut self, build: impl FnOnce(u64) -> SalaryAction) -> bool {
    match self.amount_value() {
      Some(amount) => {
        self.salary = salary::apply(self.salary, build(amount));
        true
      }
      None => false,
    }
  }

  /// Merge the draft with the carried-through fields into the wholesale
  /// replacement set submitted on save.
  fn to_fields(&self, persisted: &Member) -> NewMember {
    NewMember {
      first_name: self.first_name.value().to_string(),
      last_name: self.last_name.value().to_string(),
      email: self.email.value().to_string(),
      avatar: persisted.avatar.clone(),
      role: persisted.role.clone(),
      salary: self.salary,
    }
  }

  fn focused_input(&mut self) -> Option<&mut TextInput> {
    match self.focus? {
      EditFocus::FirstName => Some(&mut self.first_name),
      EditFocus::LastName => Some(&mut self.last_name),
      EditFocus::Email => Some(&mut self.email),
      EditFocus::Amount => Some(&mut self.amount),
    }
  }
}

/// Detail view for a single record: read-only presentation with an edit
/// mode whose state machine is
/// `loading -> {not_found | error | viewing}`, `viewing <-> editing`,
/// and `editing -> viewing` on successful save only.
pub struct MemberDetailView {
  id: String,
  store: StoreClient,
  cache: SharedQueryCache<Vec<Member>>,
  notifier: Notifier,

  /// `Ok(None)` from the store means the id does not exist
  query: Query<Option<Member>>,
  editing: bool,
  draft: EditDraft,
  save: Mutation<Member>,
}

impl MemberDetailView {
  pub fn new(
    id: String,
    store: StoreClient,
    cache: SharedQueryCache<Vec<Member>>,
    notifier: Notifier,
  ) -> Self {
    let store_for_query = store.clone();
    let query_id = id.clone();
    let mut query = Query::new(move || {
      let store = store_for_query.clone();
      let id = query_id.clone();
      async move { store.get_member(&id).await.map_err(|e| e.to_string()) }
    });
    query.fetch();

    Self {
      id,
      store,
      cache,
      notifier,
      query,
      editing: false,
      draft: EditDraft::default(),
      save: Mutation::new(),
    }
  }

  fn member(&self) -> Option<&Member> {
    self.query.data().and_then(|m| m.as_ref())
  }

  fn start_edit(&mut self) {
    if let Some(member) = self.member() {
      let member = member.clone();
      self.draft.seed(&member);
      self.editing = true;
    }
  }

  fn cancel_edit(&mut self) {
    if let Some(member) = self.member() {
      let member = member.clone();
      self.draft.seed(&member);
    }
    self.editing = false;
  }

  fn start_save(&mut self) {
    let persisted = match self.member() {
      Some(member) => member.clone(),
      None => return,
    };
    let fields = self.draft.to_fields(&persisted);
    let store = self.store.clone();
    let id = self.id.clone();

    self.save.run(async move {
      store
        .update_member(&id, &fields)
        .await
        .map_err(|e| e.to_string())?;
      Ok(fields.with_id(id))
    });
  }

  fn handle_edit_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Tab | KeyCode::Down => {
        self.draft.focus = self.draft.focus.map(EditFocus::next);
        return ViewAction::None;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.draft.focus = self.draft.focus.map(EditFocus::previous);
        return ViewAction::None;
      }
      KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        if !self.save.is_running() {
          self.start_save();
        }
        return ViewAction::None;
      }
      // Adjustments live on the amount field so +/- never collide with
      // text entry in the name/email drafts
      KeyCode::Char('+') | KeyCode::Char('=') if self.draft.focus == Some(EditFocus::Amount) => {
        self.draft.adjust(SalaryAction::Increment);
        return ViewAction::None;
      }
      KeyCode::Char('-') if self.draft.focus == Some(EditFocus::Amount) => {
        self.draft.adjust(SalaryAction::Decrement);
        return ViewAction::None;
      }
      _ => {}
    }

    if let Some(input) = self.draft.focused_input() {
      match input.handle_key(key) {
        InputResult::Cancelled => self.cancel_edit(),
        InputResult::Submitted(_) => {
          self.draft.focus = self.draft.focus.map(EditFocus::next);
        }
        InputResult::Consumed | InputResult::NotHandled => {}
      }
    }
    ViewAction::None
  }

  fn render_viewing(&self, frame: &mut Frame, member: &Member, area: Rect) {
    let lines = vec![
      Line::default(),
      Line::from(Span::styled(
        member.full_name(),
        Style::default().fg(Color::Magenta).bold(),
      )),
      Line::from(Span::styled(
        member.email.clone(),
        Style::default().fg(Color::DarkGray),
      )),
      Line::default(),
      Line::from(vec![
        Span::styled("Role:    ", Style::default().fg(Color::DarkGray)),
        Span::styled(member.role.clone(), Style::default().fg(role_color(&member.role))),
      ]),
      Line::from(vec![
        Span::styled("Salary:  ", Style::default().fg(Color::DarkGray)),
        Span::raw(format_salary(member.salary)),
      ]),
      Line::from(vec![
        Span::styled("Avatar:  ", Style::default().fg(Color::DarkGray)),
        Span::raw(member.avatar.clone()),
      ]),
      Line::default(),
      Line::from(Span::styled(
        "e edit   r refresh   q back",
        Style::default().fg(Color::DarkGray),
      )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
  }

  fn render_editing(&self, frame: &mut Frame, area: Rect) {
    let field = |label: &str, input: &TextInput, focus: EditFocus| {
      let focused = self.draft.focus == Some(focus);
      let label_style = if focused {
        Style::default().fg(Color::Magenta).bold()
      } else {
        Style::default().fg(Color::DarkGray)
      };
      let mut spans = vec![
        Span::styled(format!("{:<12}", label), label_style),
        Span::raw(input.value().to_string()),
      ];
      if focused {
        spans.push(Span::styled("_", Style::default().fg(Color::Magenta)));
      }
      Line::from(spans)
    };

    let adjust_enabled = self.draft.amount_value().is_some();
    let adjust_hint = if adjust_enabled {
      Span::styled("+/- adjust", Style::default().fg(Color::Green))
    } else {
      // Controls disabled until the amount is a positive number
      Span::styled("+/- disabled", Style::default().fg(Color::DarkGray))
    };

    let lines = vec![
      Line::default(),
      field("First Name", &self.draft.first_name, EditFocus::FirstName),
      field("Last Name", &self.draft.last_name, EditFocus::LastName),
      field("Email", &self.draft.email, EditFocus::Email),
      Line::default(),
      Line::from(vec![
        Span::styled("Salary:     ", Style::default().fg(Color::DarkGray)),
        Span::styled(
          format_salary(self.draft.salary),
          Style::default().fg(Color::White).bold(),
        ),
      ]),
      field("Amount", &self.draft.amount, EditFocus::Amount),
      Line::from(vec![Span::raw("            "), adjust_hint]),
      Line::default(),
      Line::from(Span::styled(
        if self.save.is_running() {
          "saving...   Esc cancel"
        } else {
          "Ctrl-S save   Esc cancel   Tab next field"
        },
        Style::default().fg(Color::DarkGray),
      )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let title = match self.query.state() {
      QueryState::Loading => format!(" {} (loading...) ", self.id),
      QueryState::Error(_) => format!(" {} (error) ", self.id),
      _ => match self.member() {
        Some(member) => format!(" {} ", member.full_name()),
        None => " Not found ".to_string(),
      },
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Magenta));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if self.query.is_loading() {
      let paragraph =
        Paragraph::new("Loading member details...").style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, inner);
      return;
    }

    if let Some(error) = self.query.error() {
      let paragraph = Paragraph::new(format!("Error: {}\n\nPress 'r' to retry.", error))
        .style(Style::default().fg(Color::Red));
      frame.render_widget(paragraph, inner);
      return;
    }

    match self.member() {
      Some(member) => {
        if self.editing {
          self.render_editing(frame, inner);
        } else {
          self.render_viewing(frame, member, inner);
        }
      }
      None => {
        // Terminal state: the id does not exist in the store
        let paragraph = Paragraph::new("Member not found.\n\nPress 'q' to go back.")
          .style(Style::default().fg(Color::Red));
        frame.render_widget(paragraph, inner);
      }
    }
  }
}

impl View for MemberDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.editing {
      return self.handle_edit_key(key);
    }

    match key.code {
      KeyCode::Char('e') => {
        self.start_edit();
        ViewAction::None
      }
      KeyCode::Char('r') => {
        self.query.refetch();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_detail(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    match self.member() {
      Some(member) => member.full_name(),
      None => self.id.clone(),
    }
  }

  fn tick(&mut self) {
    self.query.poll();

    if let Some(outcome) = self.save.poll() {
      match outcome {
        Ok(member) => {
          // The just-submitted values become the locally held record, and
          // the list key is invalidated so a revisit never shows the
          // pre-update fields
          self.query.set_data(Some(member));
          self.editing = false;
          self.cache.invalidate(USERS_KEY);
          self
            .notifier
            .notify(Notification::success("Member updated"));
        }
        Err(_) => {
          // Stay in edit mode with the draft intact
          self
            .notifier
            .notify(Notification::error("Failed to update member"));
        }
      }
    }
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    if self.editing {
      vec![Shortcut::new("^s", "save"), Shortcut::new("esc", "cancel")]
    } else {
      vec![
        Shortcut::new("e", "edit"),
        Shortcut::new("r", "refresh"),
        Shortcut::new("q", "back"),
      ]
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ann() -> Member {
    Member {
      id: "1".to_string(),
      first_name: "Ann".to_string(),
      last_name: "Lee".to_string(),
      email: "ann@x.com".to_string(),
      avatar: "https://example.com/a.png".to_string(),
      role: "Backend".to_string(),
      salary: 5000,
    }
  }

  #[test]
  fn test_seed_copies_persisted_fields() {
    let mut draft = EditDraft::default();
    draft.seed(&ann());
    assert_eq!(draft.first_name.value(), "Ann");
    assert_eq!(draft.email.value(), "ann@x.com");
    assert_eq!(draft.salary, 5000);
    assert!(draft.amount.is_empty());
  }

  #[test]
  fn test_adjust_requires_positive_amount() {
    let mut draft = EditDraft::default();
    draft.seed(&ann());

    // No amount entered: both controls disabled
    assert!(!draft.adjust(SalaryAction::Increment));
    assert_eq!(draft.salary, 5000);

    draft.amount.set_value("0");
    assert!(!draft.adjust(SalaryAction::Decrement));

    draft.amount.set_value("250");
    assert!(draft.adjust(SalaryAction::Increment));
    assert_eq!(draft.salary, 5250);
  }

  #[test]
  fn test_decrement_clamps_at_zero() {
    let mut draft = EditDraft::default();
    draft.seed(&ann());
    draft.amount.set_value("6000");

    assert!(draft.adjust(SalaryAction::Decrement));
    assert_eq!(draft.salary, 0);
  }

  #[test]
  fn test_cancel_restores_draft_after_any_edits() {
    let member = ann();
    let mut draft = EditDraft::default();
    draft.seed(&member);

    draft.first_name.set_value("Annabel");
    draft.email.set_value("other@x.com");
    draft.amount.set_value("9999");
    draft.adjust(SalaryAction::Increment);
    draft.adjust(SalaryAction::Decrement);
    draft.adjust(SalaryAction::Decrement);

    // Cancel re-seeds from the persisted record
    draft.seed(&member);
    assert_eq!(draft.first_name.value(), "Ann");
    assert_eq!(draft.email.value(), "ann@x.com");
    assert_eq!(draft.salary, 5000);
  }

  #[test]
  fn test_save_fields_merge_draft_with_carried_fields() {
    let member = ann();
    let mut draft = EditDraft::default();
    draft.seed(&member);

    draft.email.set_value("new@x.com");
    draft.amount.set_value("1000");
    draft.adjust(SalaryAction::Increment);

    let fields = draft.to_fields(&member);
    assert_eq!(fields.email, "new@x.com");
    assert_eq!(fields.salary, 6000);
    // Avatar and role pass through unchanged
    assert_eq!(fields.avatar, member.avatar);
    assert_eq!(fields.role, member.role);
  }

  #[tokio::test]
  async fn test_missing_id_resolves_to_not_found() {
    let mut query: Query<Option<Member>> = Query::new(|| async { Ok(None) });
    query.fetch();
    assert!(query.is_loading());

    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    assert!(query.poll());

    // Terminal state: resolved without a record, distinct from loading
    // and from a transport error
    assert!(!query.is_loading());
    assert!(!query.is_error());
    assert!(matches!(query.state(), QueryState::Success(None)));
  }

  #[test]
  fn test_focus_cycles_through_all_inputs() {
    let mut focus = EditFocus::FirstName;
    for _ in 0..4 {
      focus = focus.next();
    }
    assert_eq!(focus, EditFocus::FirstName);
    assert_eq!(EditFocus::FirstName.previous(), EditFocus::Amount);
  }
}

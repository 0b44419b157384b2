use crate::cache::{SharedQueryCache, USERS_KEY};
use crate::notify::{Notification, Notifier};
use crate::query::{Mutation, QueryState};
use crate::store::client::StoreClient;
use crate::store::types::{Member, NewMember};
use crate::ui::components::{
  FormEvent, KeyResult, MemberForm, RolePicker, RolePickerEvent, SearchEvent, SearchInput,
};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{format_salary, role_color, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::MemberDetailView;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Root view: the filterable roster list with add and delete operations.
///
/// Reads the collection through the shared query cache under the `users`
/// key; both mutations invalidate that key on success so the list becomes
/// eventually consistent with the store.
pub struct MemberListView {
  store: StoreClient,
  cache: SharedQueryCache<Vec<Member>>,
  notifier: Notifier,

  list_state: ListState,
  search: SearchInput,
  search_query: String,
  /// Exact-match role filter; empty string means match all
  role_filter: String,
  role_picker: RolePicker,
  form: MemberForm,

  add: Mutation<Member>,
  delete: Mutation<String>,
}

impl MemberListView {
  pub fn new(
    store: StoreClient,
    cache: SharedQueryCache<Vec<Member>>,
    notifier: Notifier,
  ) -> Self {
    // Ensure the list query exists and is fetching; a revisit reuses
    // whatever the cache already holds.
    let store_for_query = store.clone();
    cache.with(|cache| {
      cache.ensure(USERS_KEY, move || {
        let store = store_for_query.clone();
        async move { store.list_members().await.map_err(|e| e.to_string()) }
      });
    });

    Self {
      store,
      cache,
      notifier,
      list_state: ListState::default(),
      search: SearchInput::new(),
      search_query: String::new(),
      role_filter: String::new(),
      role_picker: RolePicker::new(),
      form: MemberForm::new(),
      add: Mutation::new(),
      delete: Mutation::new(),
    }
  }

  /// The displayed subset: both filters ANDed, re-derived on every call
  /// rather than cached.
  fn visible_members(&self) -> Vec<Member> {
    self.cache.with(|cache| {
      cache
        .get(USERS_KEY)
        .and_then(|q| q.data())
        .map(|members| {
          members
            .iter()
            .filter(|m| m.matches(&self.search_query, &self.role_filter))
            .cloned()
            .collect()
        })
        .unwrap_or_default()
    })
  }

  fn list_query_state(&self) -> QueryState<Vec<Member>> {
    self.cache.with(|cache| cache.state(USERS_KEY))
  }

  fn start_add(&mut self, member: NewMember) {
    // A repeat submit while an add is in flight would create a duplicate
    // record and drop the first outcome
    if self.add.is_running() {
      return;
    }
    let store = self.store.clone();
    self
      .add
      .run(async move { store.add_member(&member).await.map_err(|e| e.to_string()) });
  }

  fn start_delete(&mut self, id: String) {
    let store = self.store.clone();
    self.delete.run(async move {
      store.delete_member(&id).await.map_err(|e| e.to_string())?;
      Ok(id)
    });
  }

  fn selected_member(&self) -> Option<Member> {
    let members = self.visible_members();
    self
      .list_state
      .selected()
      .and_then(|idx| members.get(idx).cloned())
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let members = self.visible_members();
    ensure_valid_selection(&mut self.list_state, members.len());

    let state = self.list_query_state();
    let title = match &state {
      QueryState::Loading => " Members (loading...) ".to_string(),
      QueryState::Error(e) => format!(" Members (error: {}) ", truncate(e, 40)),
      _ => {
        let filtered = if self.role_filter.is_empty() {
          String::new()
        } else {
          format!(" [{}]", self.role_filter)
        };
        format!(" Members{} ({}) ", filtered, members.len())
      }
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Magenta));

    if members.is_empty() {
      let content = match &state {
        QueryState::Loading => "Loading members...",
        QueryState::Error(_) => "Failed to load members. Press 'r' to retry.",
        _ if !self.search_query.is_empty() || !self.role_filter.is_empty() => {
          "No members match the current filters."
        }
        _ => "No members yet. Press 'a' to add one.",
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = members
      .iter()
      .map(|member| {
        let line = Line::from(vec![
          Span::styled(
            format!("{:<24}", truncate(&member.full_name(), 24)),
            Style::default().bold(),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<28}", truncate(&member.email, 28)),
            Style::default().fg(Color::DarkGray),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<16}", truncate(&member.role, 16)),
            Style::default().fg(role_color(&member.role)),
          ),
          Span::styled(
            format!("{:>10}", format_salary(member.salary)),
            Style::default().fg(Color::White),
          ),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for MemberListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    // Open overlays take precedence: form, then role picker, then search
    if self.form.is_active() {
      match self.form.handle_key(key) {
        KeyResult::Event(FormEvent::Submitted(member)) => self.start_add(member),
        KeyResult::Event(FormEvent::Cancelled) | KeyResult::Handled => {}
        KeyResult::NotHandled => {}
      }
      return ViewAction::None;
    }

    match self.role_picker.handle_key(key) {
      KeyResult::Event(RolePickerEvent::Selected(role)) => {
        self.role_filter = role;
        return ViewAction::None;
      }
      KeyResult::Event(RolePickerEvent::Cancelled) | KeyResult::Handled => {
        return ViewAction::None;
      }
      KeyResult::NotHandled => {}
    }

    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(query)) => {
        self.search_query = query;
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Submitted) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
      }
      KeyCode::Char('r') => {
        self.cache.invalidate(USERS_KEY);
      }
      KeyCode::Char('a') => {
        self.form.open();
      }
      KeyCode::Char('f') => {
        self.role_picker.show("Filter by role", true);
      }
      // Delete is deliberately a separate binding from Enter, so removing
      // a row never also opens it
      KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        if let Some(member) = self.selected_member() {
          self.start_delete(member.id);
        }
      }
      KeyCode::Enter => {
        if let Some(member) = self.selected_member() {
          return ViewAction::Push(Box::new(MemberDetailView::new(
            member.id,
            self.store.clone(),
            self.cache.clone(),
            self.notifier.clone(),
          )));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    self.search.render_overlay(frame, area);
    self.role_picker.render_overlay(frame, area);
    self.form.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    if self.role_filter.is_empty() {
      "Members".to_string()
    } else {
      format!("Members [{}]", self.role_filter)
    }
  }

  fn tick(&mut self) {
    self.cache.with(|cache| cache.poll());

    if let Some(outcome) = self.add.poll() {
      match outcome {
        Ok(member) => {
          self.cache.invalidate(USERS_KEY);
          self.form.reset();
          self
            .notifier
            .notify(Notification::success(format!("Added {}", member.full_name())));
        }
        Err(_) => {
          // Form stays open with its values so the add can be retried
          self
            .notifier
            .notify(Notification::error("Failed to add member"));
        }
      }
    }

    if let Some(outcome) = self.delete.poll() {
      match outcome {
        Ok(_) => {
          self.cache.invalidate(USERS_KEY);
          self
            .notifier
            .notify(Notification::warning("Member deleted"));
        }
        Err(_) => {
          self
            .notifier
            .notify(Notification::error("Failed to delete member"));
        }
      }
    }
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("/", "search"),
      Shortcut::new("f", "filter"),
      Shortcut::new("a", "add"),
      Shortcut::new("^d", "delete"),
      Shortcut::new("r", "refresh"),
      Shortcut::new("q", "quit"),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Config;
  use crate::notify::NotificationCenter;
  use std::time::Duration;

  fn test_view() -> MemberListView {
    std::env::set_var("ROSTERM_API_KEY", "test-key");
    let config: Config = serde_yaml::from_str("store:\n  project_id: test\n").unwrap();
    let store = StoreClient::new(&config).unwrap();
    let (notifier, _center) = NotificationCenter::new();
    MemberListView::new(store, SharedQueryCache::new(), notifier)
  }

  fn ann_new() -> NewMember {
    NewMember {
      first_name: "Ann".to_string(),
      last_name: "Lee".to_string(),
      email: "ann@x.com".to_string(),
      avatar: "https://example.com/a.png".to_string(),
      role: "Backend".to_string(),
      salary: 5000,
    }
  }

  #[tokio::test]
  async fn test_submit_while_add_in_flight_is_ignored() {
    let mut view = test_view();

    // Park an add that resolves with a known record
    let parked = ann_new().with_id("m1".to_string());
    view.add.run(async move {
      tokio::time::sleep(Duration::from_millis(10)).await;
      Ok(parked)
    });
    assert!(view.add.is_running());

    // A second submit while the first is still running must not start a
    // new operation over the pending one
    view.start_add(ann_new());

    tokio::time::sleep(Duration::from_millis(50)).await;
    match view.add.poll() {
      Some(Ok(member)) => assert_eq!(member.id, "m1"),
      other => panic!("first add outcome was superseded: {:?}", other),
    }
  }
}

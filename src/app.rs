use crate::cache::SharedQueryCache;
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::notify::NotificationCenter;
use crate::store::client::StoreClient;
use crate::store::types::Member;
use crate::ui::renderfns::{draw_footer, draw_header};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::MemberListView;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;

/// Main application: owns the view stack, the shared query cache, and the
/// notification channel, and runs the terminal event loop.
pub struct App {
  /// Navigation stack - the list view is always at index 0
  view_stack: Vec<Box<dyn View>>,

  config: Config,
  notifications: NotificationCenter,
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let store = StoreClient::new(&config)?;

    // The cache is owned here and handed to views as an explicit
    // dependency; mutations anywhere invalidate keys every reader sees
    let cache: SharedQueryCache<Vec<Member>> = SharedQueryCache::new();
    let (notifier, notifications) = NotificationCenter::new();

    let root = MemberListView::new(store, cache, notifier);

    Ok(Self {
      view_stack: vec![Box::new(root)],
      config,
      notifications,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(Duration::from_millis(250));

    // Main loop
    while !self.should_quit {
      terminal.draw(|frame| self.draw(frame))?;

      if let Some(event) = events.next().await {
        match event {
          Event::Key(key) => self.handle_key(key),
          Event::Tick => self.tick(),
        }
      }
    }

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  fn draw(&mut self, frame: &mut Frame) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Header
        Constraint::Min(1),    // Current view
        Constraint::Length(1), // Footer
      ])
      .split(frame.area());

    let breadcrumb: Vec<String> = self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect();

    if let Some(view) = self.view_stack.last_mut() {
      let shortcuts = view.shortcuts();
      draw_header(frame, chunks[0], self.config.display_title(), &shortcuts);
      view.render(frame, chunks[1]);
    }

    draw_footer(frame, chunks[2], &breadcrumb, self.notifications.current());
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::None,
    };

    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          // A popped view is dropped, and with it any in-flight query
          // receivers - late results can never touch a torn-down view
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  fn tick(&mut self) {
    self.notifications.tick();
    if let Some(view) = self.view_stack.last_mut() {
      view.tick();
    }
  }
}

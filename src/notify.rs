//! Transient notifications ("toasts") surfaced in the footer.
//!
//! Views emit notifications through a cloned `Notifier`; the app root owns
//! the receiving end, keeps the most recent one, and expires it after a few
//! seconds of display.

use ratatui::style::Color;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// How long a notification stays visible
const DISPLAY_TIME: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Success,
  Warning,
  Error,
}

impl Level {
  pub fn color(&self) -> Color {
    match self {
      Level::Success => Color::Green,
      Level::Warning => Color::Yellow,
      Level::Error => Color::Red,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub level: Level,
  pub message: String,
}

impl Notification {
  pub fn success(message: impl Into<String>) -> Self {
    Self {
      level: Level::Success,
      message: message.into(),
    }
  }

  pub fn warning(message: impl Into<String>) -> Self {
    Self {
      level: Level::Warning,
      message: message.into(),
    }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self {
      level: Level::Error,
      message: message.into(),
    }
  }
}

/// Sending half handed to views and async tasks
#[derive(Debug, Clone)]
pub struct Notifier {
  tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
  pub fn notify(&self, notification: Notification) {
    // Send failure means the app is shutting down
    let _ = self.tx.send(notification);
  }
}

/// Receiving half owned by the app root
#[derive(Debug)]
pub struct NotificationCenter {
  rx: mpsc::UnboundedReceiver<Notification>,
  current: Option<(Notification, Instant)>,
}

impl NotificationCenter {
  pub fn new() -> (Notifier, Self) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
      Notifier { tx },
      Self { rx, current: None },
    )
  }

  /// Drain pending notifications and expire the displayed one. Called on
  /// every tick; the latest notification wins.
  pub fn tick(&mut self) {
    while let Ok(notification) = self.rx.try_recv() {
      self.current = Some((notification, Instant::now()));
    }

    if let Some((_, shown_at)) = &self.current {
      if shown_at.elapsed() > DISPLAY_TIME {
        self.current = None;
      }
    }
  }

  /// The notification to render, if one is active
  pub fn current(&self) -> Option<&Notification> {
    self.current.as_ref().map(|(n, _)| n)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_latest_notification_wins() {
    let (notifier, mut center) = NotificationCenter::new();
    notifier.notify(Notification::success("first"));
    notifier.notify(Notification::error("second"));

    center.tick();
    assert_eq!(center.current().map(|n| n.message.as_str()), Some("second"));
    assert_eq!(center.current().map(|n| n.level), Some(Level::Error));
  }

  #[tokio::test]
  async fn test_nothing_pending() {
    let (_notifier, mut center) = NotificationCenter::new();
    center.tick();
    assert!(center.current().is_none());
  }
}

//! Transient toast notifications.
//!
//! Screens report user-facing outcomes ("Order placed successfully") through
//! a [`Notifier`]. The app installs one that renders real toasts; the CLI
//! logs them, and tests record them.

use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tracing::info;

/// Where a toast appears on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastPosition {
    Top,
    Middle,
    #[default]
    Bottom,
}

impl FromStr for ToastPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "middle" => Ok(Self::Middle),
            "bottom" => Ok(Self::Bottom),
            _ => Err(format!("invalid toast position: {s}")),
        }
    }
}

/// Presentation settings shared by every toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastSettings {
    pub duration: Duration,
    pub show_close_button: bool,
    pub close_button_text: String,
    pub position: ToastPosition,
}

impl Default for ToastSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(3000),
            show_close_button: false,
            close_button_text: "Ok".to_string(),
            position: ToastPosition::Bottom,
        }
    }
}

/// Sink for toast messages.
pub trait Notifier: Send + Sync {
    /// Show `message` using `settings`.
    fn toast(&self, settings: &ToastSettings, message: &str);
}

/// Writes toasts to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn toast(&self, settings: &ToastSettings, message: &str) {
        info!(
            duration_ms = u64::try_from(settings.duration.as_millis()).unwrap_or(u64::MAX),
            position = ?settings.position,
            "{message}"
        );
    }
}

/// Keeps every toast in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages shown so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn toast(&self, _settings: &ToastSettings, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_owned());
    }
}

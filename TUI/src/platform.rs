//! Clipboard and desktop notification seams. Both are optional: callers
//! surface failures as a toast and carry on.

use arboard::Clipboard;
use notify_rust::{Notification, Timeout};
use tracing::debug;

use crate::error::{AppError, Result};

/// Application name for notifications
const APP_NAME: &str = "threadsim";

const NOTIFY_TIMEOUT_MS: u32 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    /// Not asked yet
    #[default]
    Default,
    Granted,
    Denied,
}

pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

pub trait Notifier {
    fn request_permission(&mut self) -> Permission;
    fn notify(&mut self, title: &str, body: &str) -> Result<()>;
}

/// System clipboard, opened per call.
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard = Clipboard::new().map_err(|e| AppError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| AppError::Clipboard(e.to_string()))
    }
}

/// Freedesktop/macOS/Windows notifications through notify-rust.
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn request_permission(&mut self) -> Permission {
        // Desktop notification daemons have no consent step
        Permission::Granted
    }

    fn notify(&mut self, title: &str, body: &str) -> Result<()> {
        debug!("Showing notification: {} - {}", title, body);
        Notification::new()
            .appname(APP_NAME)
            .summary(title)
            .body(body)
            .timeout(Timeout::Milliseconds(NOTIFY_TIMEOUT_MS))
            .show()
            .map(|_| ())
            .map_err(|e| AppError::Notification(e.to_string()))
    }
}

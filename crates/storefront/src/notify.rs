//! Hooks into the (external) rendering layer.
//!
//! The storefront never draws anything. After each state change it calls
//! [`Notifier::cart_changed`] so the UI can redraw the cart badge and list,
//! and it reports every user-visible outcome through [`Notifier::notify`].

use std::sync::Mutex;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::models::CartLine;
use crate::models::cart::checked_quantity;

/// Severity of a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationLevel {
    /// Title shown above the message.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Info => "Info",
        }
    }
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }
}

/// Receiver for user-facing messages and redraw requests.
pub trait Notifier: Send + Sync {
    /// Show `notification` to the user.
    fn notify(&self, notification: &Notification);

    /// The cart now holds `lines`; redraw anything derived from it.
    fn cart_changed(&self, _lines: &[CartLine]) {}
}

/// Writes notifications to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        let title = notification.level.title();
        match notification.level {
            NotificationLevel::Error => error!(title, "{}", notification.message),
            NotificationLevel::Warning => warn!(title, "{}", notification.message),
            NotificationLevel::Success | NotificationLevel::Info => {
                info!(title, "{}", notification.message);
            }
        }
    }

    fn cart_changed(&self, lines: &[CartLine]) {
        let items = checked_quantity(lines);
        info!(lines = lines.len(), items = ?items, "Cart changed");
    }
}

/// Keeps every notification and redraw in memory for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
    renders: Mutex<Vec<Vec<CartLine>>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications received so far.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    /// The most recent notification, if any.
    #[must_use]
    pub fn last(&self) -> Option<Notification> {
        self.notifications().pop()
    }

    /// Every cart snapshot passed to `cart_changed`, oldest first.
    #[must_use]
    pub fn renders(&self) -> Vec<Vec<CartLine>> {
        self.renders.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push(notification.clone());
        }
    }

    fn cart_changed(&self, lines: &[CartLine]) {
        if let Ok(mut renders) = self.renders.lock() {
            renders.push(lines.to_vec());
        }
    }
}

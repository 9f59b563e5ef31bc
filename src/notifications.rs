//! Desktop notifications for problems the user should fix
//!
//! Only configuration errors and collisions are reported; everything else
//! stays in the log.

use notify_rust::{Notification, Timeout};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Global flag to enable/disable notifications
static NOTIFICATIONS_ENABLED: AtomicBool = AtomicBool::new(false);

/// Initialize notifications with the enabled setting
pub fn init(enabled: bool) {
    NOTIFICATIONS_ENABLED.store(enabled, Ordering::SeqCst);
}

/// Check if notifications are enabled
pub fn is_enabled() -> bool {
    NOTIFICATIONS_ENABLED.load(Ordering::SeqCst)
}

#[derive(Debug, Clone, Copy)]
pub enum NotificationKind {
    /// Bad pattern or missing inbox folder
    ConfigError,
    /// Destination already occupied
    Collision,
}

impl NotificationKind {
    fn icon(&self) -> &'static str {
        match self {
            NotificationKind::ConfigError => "dialog-error",
            NotificationKind::Collision => "dialog-warning",
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            NotificationKind::ConfigError => "Configuration Error",
            NotificationKind::Collision => "File Not Moved",
        }
    }
}

/// Send a notification if enabled
///
/// Fire-and-forget: failures are logged and dropped.
pub fn notify(kind: NotificationKind, message: &str) {
    if !is_enabled() {
        return;
    }

    let result = Notification::new()
        .appname("Inbox Processor")
        .summary(&format!("Inbox Processor: {}", kind.prefix()))
        .body(message)
        .icon(kind.icon())
        .timeout(Timeout::Milliseconds(5000))
        .show();

    if let Err(e) = result {
        warn!("Failed to send notification: {}", e);
    }
}

pub fn notify_config_error(message: &str) {
    notify(NotificationKind::ConfigError, message);
}

pub fn notify_collision(file_name: &str, destination: &str) {
    notify(
        NotificationKind::Collision,
        &format!("'{}' already exists at {}", file_name, destination),
    );
}

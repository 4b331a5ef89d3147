use notify_rust::{Notification, Timeout};
use tracing::{debug, warn};

/// Desktop notifications, used while the window is hidden in the tray
pub struct NotificationManager {
    enabled: bool,
    app_name: String,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self {
            enabled: true,
            app_name: "Quick Folder Finder".to_string(),
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        debug!("Notifications {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn show_info(&self, title: &str, message: &str) {
        self.show(title, message, "dialog-information", 5000);
    }

    pub fn show_error(&self, title: &str, message: &str) {
        self.show(title, message, "dialog-error", 10000);
    }

    fn show(&self, title: &str, message: &str, icon: &str, timeout_ms: u32) {
        if !self.enabled {
            return;
        }

        if let Err(e) = Notification::new()
            .summary(title)
            .body(message)
            .appname(&self.app_name)
            .icon(icon)
            .timeout(Timeout::Milliseconds(timeout_ms))
            .show()
        {
            warn!("Failed to show notification: {}", e);
        } else {
            debug!("Showed notification: {} - {}", title, message);
        }
    }

    pub fn notify_launch_failed(&self, path: &str, reason: &str) {
        self.show_error("Unable to open folder", &format!("{}: {}", path, reason));
    }

    pub fn notify_hidden_to_tray(&self) {
        self.show_info(
            "Quick Folder Finder",
            "Still running in the tray. Your hotkeys stay active.",
        );
    }
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

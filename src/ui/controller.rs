use crate::events::AppEvent;
use crate::hotkey::{normalize, BindError, HotkeyRegistry};
use crate::storage::{Binding, ConfigStore};
use crate::ui::tray::TrayMessage;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Colour class of the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

impl Status {
    fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Outcome of an assign, as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindResult {
    pub key: String,
    pub path: String,
    pub success: bool,
    pub message: String,
}

/// What the window should do after a controller callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAction {
    None,
    Show,
    HideToTray,
    Close,
}

/// One editable line in the window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderRow {
    pub path: String,
    pub key: String,
    /// Canonical hotkey this row currently holds, if it was assigned
    bound_key: Option<String>,
}

impl FolderRow {
    pub fn bound_key(&self) -> Option<&str> {
        self.bound_key.as_deref()
    }
}

/// Window-independent half of the UI: rows, status line and the calls into
/// the registry. The egui window only renders this and forwards clicks.
pub struct AppController {
    registry: HotkeyRegistry,
    store: Arc<ConfigStore>,
    rows: Vec<FolderRow>,
    status: Option<Status>,
    tray_available: bool,
    hidden: bool,
}

impl AppController {
    pub fn new(registry: HotkeyRegistry) -> Self {
        let store = registry.store().clone();
        let rows = store
            .bindings()
            .into_iter()
            .map(|b| FolderRow {
                bound_key: normalize(&b.key).ok(),
                path: b.path,
                key: b.key,
            })
            .collect();

        Self {
            registry,
            store,
            rows,
            status: None,
            tray_available: false,
            hidden: false,
        }
    }

    /// Whether a tray icon exists to bring the window back after hiding
    pub fn set_tray_available(&mut self, available: bool) {
        self.tray_available = available;
    }

    /// Every saved binding ordered by key
    pub fn bindings(&self) -> Vec<Binding> {
        self.store.bindings()
    }

    pub fn registry(&self) -> &HotkeyRegistry {
        &self.registry
    }

    pub fn rows(&self) -> &[FolderRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [FolderRow] {
        &mut self.rows
    }

    pub fn add_row(&mut self, path: impl Into<String>) {
        self.rows.push(FolderRow {
            path: path.into(),
            ..Default::default()
        });
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Show a warning collected during startup
    pub fn warn(&mut self, text: impl Into<String>) {
        self.status = Some(Status::new(StatusKind::Error, text));
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Bind `key` to `path` and report the outcome on the status line
    pub fn on_assign(&mut self, path: &str, key: &str) -> BindResult {
        let result = match self.registry.bind(key, path) {
            Ok(binding) => {
                let message = format!("Key '{}' assigned to {}", binding.key, folder_name(&binding.path));
                self.status = Some(Status::new(StatusKind::Success, &message));
                BindResult {
                    key: binding.key,
                    path: binding.path,
                    success: true,
                    message,
                }
            }
            Err(BindError::Invalid(e)) => {
                debug!("Rejected assign of '{}' to '{}': {}", key, path, e);
                let message = "Please enter a valid path and key".to_string();
                self.status = Some(Status::new(StatusKind::Error, &message));
                BindResult {
                    key: key.to_string(),
                    path: path.to_string(),
                    success: false,
                    message,
                }
            }
            Err(e) => {
                let key = normalize(key).unwrap_or_else(|_| key.trim().to_lowercase());
                let message = if e.is_bound() {
                    format!("Key '{}' assigned to {}, but {}", key, folder_name(path), e)
                } else {
                    e.to_string()
                };
                self.status = Some(Status::new(StatusKind::Error, &message));
                BindResult {
                    key,
                    path: path.trim().to_string(),
                    success: e.is_bound(),
                    message,
                }
            }
        };

        info!("Assign result: {:?}", result);
        result
    }

    /// Assign the row at `index`.
    ///
    /// On success the row shows the canonical key, the hotkey it held before
    /// (if different) is released, and any other row holding the same hotkey
    /// is dropped, since that binding was just replaced.
    pub fn assign_row(&mut self, index: usize) -> Option<BindResult> {
        let row = self.rows.get(index)?.clone();
        let result = self.on_assign(&row.path, &row.key);
        if !result.success {
            return Some(result);
        }

        if let Some(previous) = row.bound_key.as_deref().filter(|k| *k != result.key) {
            info!("Row moved from '{}' to '{}'", previous, result.key);
            if let Err(e) = self.registry.unbind(previous) {
                error!("Failed to save after releasing '{}': {}", previous, e);
            }
        }

        let assigned = &mut self.rows[index];
        assigned.key = result.key.clone();
        assigned.path = result.path.clone();
        assigned.bound_key = Some(result.key.clone());

        let mut position = 0;
        self.rows.retain(|other| {
            let stale = other.bound_key.as_deref() == Some(result.key.as_str())
                || normalize(&other.key).map_or(false, |k| k == result.key);
            let keep = position == index || !stale;
            position += 1;
            keep
        });

        Some(result)
    }

    /// Unbind `key` and report the removal
    pub fn on_delete(&mut self, key: &str) -> Status {
        let shown = normalize(key).unwrap_or_else(|_| key.trim().to_lowercase());
        let status = match self.registry.unbind(key) {
            Ok(()) => Status::new(StatusKind::Info, format!("Folder and key '{}' removed", shown)),
            Err(e) => {
                error!("Failed to save after removing '{}': {}", shown, e);
                Status::new(StatusKind::Error, format!("Key '{}' removed, but {}", shown, e))
            }
        };
        self.status = Some(status.clone());
        status
    }

    /// Remove the row at `index` from the window and unbind its key
    pub fn delete_row(&mut self, index: usize) -> Option<Status> {
        if index >= self.rows.len() {
            return None;
        }
        let row = self.rows.remove(index);
        let key = row.bound_key.unwrap_or(row.key);
        Some(self.on_delete(&key))
    }

    /// Apply an event coming from a background thread
    pub fn handle_event(&mut self, event: AppEvent) -> WindowAction {
        match event {
            AppEvent::FolderOpened { path, .. } => {
                self.status = Some(Status::new(StatusKind::Info, format!("Opened {}", folder_name(&path))));
                WindowAction::None
            }
            AppEvent::LaunchFailed { path, message, .. } => {
                self.status = Some(Status::new(
                    StatusKind::Error,
                    format!("Unable to open {}: {}", path, message),
                ));
                WindowAction::None
            }
            AppEvent::Tray(TrayMessage::Open) => self.show_main_window(),
            AppEvent::Tray(TrayMessage::Exit) | AppEvent::ExitRequested => self.request_exit(),
        }
    }

    /// Window close button: save, then let the window close
    pub fn on_close(&mut self) -> WindowAction {
        if let Err(e) = self.store.flush() {
            error!("Failed to save folder mapping on close: {}", e);
        }
        WindowAction::Close
    }

    /// Window minimized: hide it while the tray keeps the app reachable
    pub fn on_minimize(&mut self) -> WindowAction {
        if !self.tray_available {
            debug!("No tray icon, leaving window minimized");
            return WindowAction::None;
        }
        if self.hidden {
            return WindowAction::None;
        }
        self.hidden = true;
        info!("Window hidden to tray");
        WindowAction::HideToTray
    }

    /// The user brought the window back without going through the tray
    pub fn on_restored(&mut self) {
        if self.hidden {
            self.hidden = false;
            debug!("Window restored from the taskbar");
        }
    }

    pub fn show_main_window(&mut self) -> WindowAction {
        self.hidden = false;
        info!("Showing main window");
        WindowAction::Show
    }

    pub fn hide_to_tray(&mut self) -> WindowAction {
        self.on_minimize()
    }

    /// Final save, release every hotkey, then close
    pub fn request_exit(&mut self) -> WindowAction {
        info!("Exit requested");
        if let Err(e) = self.store.flush() {
            warn!("Final save failed: {}", e);
        }
        self.registry.shutdown();
        WindowAction::Close
    }
}

fn folder_name(path: &str) -> String {
    Path::new(path.trim())
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.trim().to_string())
}

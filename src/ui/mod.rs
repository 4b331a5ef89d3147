pub mod controller;
pub mod notifications;
pub mod tray;
pub mod window;

pub use controller::{AppController, BindResult, FolderRow, Status, StatusKind, WindowAction};
pub use notifications::NotificationManager;
pub use tray::{SystemTray, TrayMessage};

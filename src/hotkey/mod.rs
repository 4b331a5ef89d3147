//! Global hotkeys that open folders
//!
//! `HotkeyRegistry` owns every live registration and is the only thing that
//! talks to the OS hotkey facility (through `HotkeyBackend`). Presses arrive on
//! the listener thread and are resolved by the shared `Dispatcher`.

pub mod backend;
pub mod combo;
pub mod error;
pub mod registry;

pub use backend::{
    spawn_listener, GlobalHotkeyBackend, HotkeyBackend, HotkeyId, UnavailableBackend,
};
pub use combo::{normalize, HotkeyCombo, Modifier};
pub use error::{BindError, ValidationError};
pub use registry::{ActiveRegistration, Dispatcher, HotkeyRegistry};

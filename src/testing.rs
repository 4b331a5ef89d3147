//! Test doubles for the hotkey system and the folder launcher
//!
//! `FakeBackend` stands in for the OS hotkey facility and `RecordingLauncher`
//! for the file browser. Both keep their state behind an `Arc` so a test can
//! hand one clone to the registry and inspect the other.

use crate::hotkey::{BindError, HotkeyBackend, HotkeyCombo, HotkeyId};
use crate::launcher::{FolderLauncher, LaunchError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct FakeState {
    next_id: u32,
    registered: HashMap<HotkeyId, String>,
    reserved: HashSet<String>,
    fail_next: bool,
    register_calls: usize,
    unregister_calls: usize,
}

/// In-memory hotkey facility
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combos (canonical form) that another application already holds
    pub fn reserve(&self, combo: &str) {
        self.state.lock().unwrap().reserved.insert(combo.to_string());
    }

    /// Make the next `register` call fail once
    pub fn fail_next_register(&self) {
        self.state.lock().unwrap().fail_next = true;
    }

    /// Ids currently registered for `combo`
    pub fn ids_for(&self, combo: &str) -> Vec<HotkeyId> {
        self.state
            .lock()
            .unwrap()
            .registered
            .iter()
            .filter(|(_, c)| c.as_str() == combo)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn registered_count(&self) -> usize {
        self.state.lock().unwrap().registered.len()
    }

    pub fn register_calls(&self) -> usize {
        self.state.lock().unwrap().register_calls
    }

    pub fn unregister_calls(&self) -> usize {
        self.state.lock().unwrap().unregister_calls
    }
}

impl HotkeyBackend for FakeBackend {
    fn register(&mut self, combo: &HotkeyCombo) -> Result<HotkeyId, BindError> {
        let mut state = self.state.lock().unwrap();
        state.register_calls += 1;
        let key = combo.to_string();

        if std::mem::take(&mut state.fail_next) {
            return Err(BindError::Rejected {
                key,
                reason: "injected failure".to_string(),
            });
        }
        if state.reserved.contains(&key) {
            return Err(BindError::Rejected {
                key,
                reason: "already registered by another application".to_string(),
            });
        }
        if state.registered.values().any(|c| *c == key) {
            return Err(BindError::Rejected {
                key,
                reason: "already registered".to_string(),
            });
        }

        state.next_id += 1;
        let id = HotkeyId(state.next_id);
        state.registered.insert(id, key);
        Ok(id)
    }

    fn unregister(&mut self, id: HotkeyId) -> Result<(), BindError> {
        let mut state = self.state.lock().unwrap();
        state.unregister_calls += 1;
        state.registered.remove(&id);
        Ok(())
    }
}

/// Launcher that records every request and fails for missing directories
#[derive(Debug, Clone, Default)]
pub struct RecordingLauncher {
    opened: Arc<Mutex<Vec<PathBuf>>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every path `open` was called with, successful or not
    pub fn attempts(&self) -> Vec<PathBuf> {
        self.opened.lock().unwrap().clone()
    }
}

impl FolderLauncher for RecordingLauncher {
    fn open(&self, path: &Path) -> Result<(), LaunchError> {
        self.opened.lock().unwrap().push(path.to_path_buf());
        if path.is_dir() {
            Ok(())
        } else {
            Err(LaunchError::NotFound(path.to_path_buf()))
        }
    }
}

#![allow(dead_code)]

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

use quickfolder::events::{AppEvent, EventSink};
use quickfolder::hotkey::HotkeyRegistry;
use quickfolder::storage::{ConfigStore, DEFAULT_FILE_NAME};
use quickfolder::testing::{FakeBackend, RecordingLauncher};

/// Scratch directory holding a mapping file and some real folders
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub config_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join(DEFAULT_FILE_NAME);
        Ok(Self {
            temp_dir,
            config_path,
        })
    }

    /// Create a folder inside the environment and return its path as a string
    pub fn create_folder(&self, name: &str) -> Result<String> {
        let path = self.temp_dir.path().join(name);
        std::fs::create_dir_all(&path)?;
        Ok(path.display().to_string())
    }

    pub fn write_config(&self, content: &str) -> Result<()> {
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }

    pub fn read_config(&self) -> Result<String> {
        Ok(std::fs::read_to_string(&self.config_path)?)
    }

    /// Open the store the way a fresh process start would
    pub fn open_store(&self) -> Arc<ConfigStore> {
        Arc::new(ConfigStore::open(&self.config_path))
    }

    /// Registry wired to fakes, with the stored mapping already loaded
    pub fn start(&self) -> Harness {
        let store = self.open_store();
        let backend = FakeBackend::new();
        let launcher = RecordingLauncher::new();
        let (events, receiver) = EventSink::new();
        let mut registry = HotkeyRegistry::new(
            Box::new(backend.clone()),
            store.clone(),
            Arc::new(launcher.clone()),
            events,
        );
        registry.load_all(&store.mapping());

        Harness {
            registry,
            store,
            backend,
            launcher,
            events: receiver,
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}

pub struct Harness {
    pub registry: HotkeyRegistry,
    pub store: Arc<ConfigStore>,
    pub backend: FakeBackend,
    pub launcher: RecordingLauncher,
    pub events: mpsc::UnboundedReceiver<AppEvent>,
}

impl Harness {
    /// Pending events, in the order they were sent
    pub fn drain_events(&mut self) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

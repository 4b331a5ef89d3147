use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use quickfolder::events::{AppEvent, EventSink};
use quickfolder::hotkey::{
    spawn_listener, GlobalHotkeyBackend, HotkeyBackend, HotkeyRegistry, UnavailableBackend,
};
use quickfolder::launcher::SystemLauncher;
use quickfolder::storage::ConfigStore;
use quickfolder::ui::{window, AppController};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quickfolder=debug")),
        )
        .init();

    info!("Starting Quick Folder Finder...");

    let store = Arc::new(ConfigStore::open(ConfigStore::default_path()));
    info!("Folder mapping at {:?}", store.path());

    let (events, event_receiver) = EventSink::new();

    // The hotkey manager belongs to the main thread
    let backend: Box<dyn HotkeyBackend> = match GlobalHotkeyBackend::new() {
        Ok(backend) => Box::new(backend),
        Err(e) => {
            error!("Global hotkeys unavailable: {}", e);
            Box::new(UnavailableBackend::new(e.to_string()))
        }
    };

    let mut registry = HotkeyRegistry::new(
        backend,
        store.clone(),
        Arc::new(SystemLauncher),
        events.clone(),
    );
    let failures = registry.load_all(&store.mapping());

    if let Err(e) = spawn_listener(registry.dispatcher()) {
        error!("Failed to start hotkey listener: {}", e);
    }

    let mut controller = AppController::new(registry);
    if let Some(warning) = store.load_warning() {
        controller.warn(format!("Started with no folders: {}", warning));
    } else if !failures.is_empty() {
        let keys: Vec<&str> = failures.iter().map(|(key, _)| key.as_str()).collect();
        controller.warn(format!("Could not activate: {}", keys.join(", ")));
    }

    // Ctrl+C takes the same path as the tray's Exit
    let exit_events = events.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received");
            exit_events.send(AppEvent::ExitRequested);
        }
    });

    window::run(controller, event_receiver, events)?;

    if let Err(e) = store.flush() {
        warn!("Final save failed: {}", e);
    }
    info!("Shutting down Quick Folder Finder...");

    Ok(())
}

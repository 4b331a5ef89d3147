use super::backend::{HotkeyBackend, HotkeyId};
use super::combo::{normalize, HotkeyCombo};
use super::error::{BindError, ValidationError};
use crate::events::{AppEvent, EventSink};
use crate::launcher::{FolderLauncher, LaunchError};
use crate::storage::{Binding, ConfigStore, Mapping, StoreError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// A live hotkey: the id the backend gave us and the binding it opens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRegistration {
    pub id: HotkeyId,
    pub binding: Binding,
}

/// Shared with the listener thread; resolves a pressed id to its folder
pub struct Dispatcher {
    active: Mutex<HashMap<HotkeyId, Binding>>,
    launcher: Arc<dyn FolderLauncher>,
    events: EventSink,
}

impl Dispatcher {
    pub fn new(launcher: Arc<dyn FolderLauncher>, events: EventSink) -> Self {
        Self {
            active: Mutex::new(HashMap::new()),
            launcher,
            events,
        }
    }

    /// Open the folder bound to `id`.
    ///
    /// Returns `None` when nothing is bound to `id`. A failed launch is
    /// reported but leaves the binding in place.
    pub fn dispatch(&self, id: HotkeyId) -> Option<Result<(), LaunchError>> {
        let binding = self.lock().get(&id).cloned()?;

        info!("Hotkey '{}' pressed, opening {}", binding.key, binding.path);
        let result = self.launcher.open(Path::new(&binding.path));

        match &result {
            Ok(()) => self.events.send(AppEvent::FolderOpened {
                key: binding.key,
                path: binding.path,
            }),
            Err(e) => {
                warn!("Failed to open folder for '{}': {}", binding.key, e);
                self.events.send(AppEvent::LaunchFailed {
                    key: binding.key,
                    path: binding.path,
                    message: e.to_string(),
                });
            }
        }

        Some(result)
    }

    fn insert(&self, id: HotkeyId, binding: Binding) {
        self.lock().insert(id, binding);
    }

    fn forget(&self, id: HotkeyId) {
        self.lock().remove(&id);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<HotkeyId, Binding>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps the hotkey system's registrations in step with the mapping.
///
/// Registration success gates persistence: the store is only written after
/// the backend accepted the combo.
pub struct HotkeyRegistry {
    backend: Box<dyn HotkeyBackend>,
    store: Arc<ConfigStore>,
    dispatcher: Arc<Dispatcher>,
    registrations: HashMap<String, ActiveRegistration>,
}

impl HotkeyRegistry {
    pub fn new(
        backend: Box<dyn HotkeyBackend>,
        store: Arc<ConfigStore>,
        launcher: Arc<dyn FolderLauncher>,
        events: EventSink,
    ) -> Self {
        Self {
            backend,
            store,
            dispatcher: Arc::new(Dispatcher::new(launcher, events)),
            registrations: HashMap::new(),
        }
    }

    /// Dispatcher to hand to the hotkey listener thread
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.clone()
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    /// Bind `key` to `path` and save it. Re-binding a key replaces it.
    ///
    /// Older spellings of the same hotkey in the mapping are dropped in the
    /// same write.
    pub fn bind(&mut self, key: &str, path: &str) -> Result<Binding, BindError> {
        let combo = HotkeyCombo::parse(key)?;
        let path = path.trim();
        if path.is_empty() {
            return Err(ValidationError::EmptyPath.into());
        }

        let binding = Binding::new(combo.to_string(), path);
        self.register(&combo, binding.clone())?;

        let stale: Vec<String> = self
            .stored_spellings(&binding.key)
            .into_iter()
            .filter(|k| *k != binding.key)
            .collect();
        self.store
            .replace(&stale, &binding.key, &binding.path)
            .map_err(BindError::NotSaved)?;

        info!("Bound '{}' to {}", binding.key, binding.path);
        Ok(binding)
    }

    /// Remove `key` from the hotkey system and the mapping, under every
    /// spelling it is stored as.
    ///
    /// Unbinding a key that was never bound only rewrites the unchanged mapping.
    pub fn unbind(&mut self, key: &str) -> Result<(), StoreError> {
        let normalized = normalize(key).unwrap_or_else(|_| key.trim().to_lowercase());

        if let Some(registration) = self.registrations.remove(&normalized) {
            self.release(&registration);
            info!("Unbound '{}'", normalized);
        } else {
            debug!("'{}' was not bound", normalized);
        }

        let mut keys = self.stored_spellings(&normalized);
        if !keys.contains(&normalized) {
            keys.push(normalized);
        }
        self.store.remove_keys(&keys)
    }

    /// Register every stored binding without writing the mapping back.
    ///
    /// When one hotkey is stored under several spellings, the canonical
    /// spelling wins. Returns the entries that could not be registered.
    pub fn load_all(&mut self, mapping: &Mapping) -> Vec<(String, BindError)> {
        let mut failures = Vec::new();
        let mut entries: Vec<(&String, &String, Result<HotkeyCombo, ValidationError>)> = mapping
            .iter()
            .map(|(stored_key, path)| (stored_key, path, HotkeyCombo::parse(stored_key)))
            .collect();
        entries.sort_by_key(|(stored_key, _, combo)| {
            combo.as_ref().map_or(false, |c| c.to_string() == **stored_key)
        });

        for (stored_key, path, combo) in entries {
            let result = combo.map_err(BindError::from).and_then(|combo| {
                if path.trim().is_empty() {
                    return Err(ValidationError::EmptyPath.into());
                }
                let binding = Binding::new(combo.to_string(), path.trim());
                self.register(&combo, binding)
            });

            match result {
                Ok(Some(shadowed)) => debug!(
                    "'{}' overrides {} for '{}'",
                    stored_key, shadowed.binding.path, shadowed.binding.key
                ),
                Ok(None) => {}
                Err(e) => {
                    warn!("Could not register '{}' -> {}: {}", stored_key, path, e);
                    failures.push((stored_key.clone(), e));
                }
            }
        }

        info!(
            "Registered {} of {} stored hotkey(s)",
            self.registrations.len(),
            mapping.len()
        );
        failures
    }

    /// Open the folder bound to `id`, as the listener would
    pub fn dispatch(&self, id: HotkeyId) -> Option<Result<(), LaunchError>> {
        self.dispatcher.dispatch(id)
    }

    pub fn is_bound(&self, key: &str) -> bool {
        normalize(key)
            .map(|k| self.registrations.contains_key(&k))
            .unwrap_or(false)
    }

    pub fn registration(&self, key: &str) -> Option<&ActiveRegistration> {
        self.registrations.get(&normalize(key).ok()?)
    }

    /// Active bindings ordered by key
    pub fn active_bindings(&self) -> Vec<Binding> {
        let mut bindings: Vec<Binding> = self
            .registrations
            .values()
            .map(|r| r.binding.clone())
            .collect();
        bindings.sort_by(|a, b| a.key.cmp(&b.key));
        bindings
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Unregister everything; the mapping is left untouched
    pub fn shutdown(&mut self) {
        let registrations: Vec<_> = self.registrations.drain().map(|(_, r)| r).collect();
        for registration in &registrations {
            self.release(registration);
        }
        debug!("Released {} hotkey(s)", registrations.len());
    }

    // Unregister-then-register. If the new registration fails, the previous
    // one for the same key is put back so the key keeps working.
    fn register(
        &mut self,
        combo: &HotkeyCombo,
        binding: Binding,
    ) -> Result<Option<ActiveRegistration>, BindError> {
        let previous = self.registrations.remove(&binding.key);
        if let Some(previous) = &previous {
            self.release(previous);
        }

        match self.backend.register(combo) {
            Ok(id) => {
                self.dispatcher.insert(id, binding.clone());
                self.registrations.insert(
                    binding.key.clone(),
                    ActiveRegistration { id, binding },
                );
                Ok(previous)
            }
            Err(e) => {
                if let Some(previous) = previous {
                    self.restore(combo, previous);
                }
                Err(e)
            }
        }
    }

    fn restore(&mut self, combo: &HotkeyCombo, mut previous: ActiveRegistration) {
        match self.backend.register(combo) {
            Ok(id) => {
                previous.id = id;
                self.dispatcher.insert(id, previous.binding.clone());
                self.registrations
                    .insert(previous.binding.key.clone(), previous);
            }
            Err(e) => warn!(
                "Could not restore hotkey '{}': {}",
                previous.binding.key, e
            ),
        }
    }

    // Keys in the mapping that normalize to `canonical`
    fn stored_spellings(&self, canonical: &str) -> Vec<String> {
        self.store
            .mapping()
            .into_keys()
            .filter(|stored| normalize(stored).map_or(false, |k| k == canonical))
            .collect()
    }

    fn release(&mut self, registration: &ActiveRegistration) {
        self.dispatcher.forget(registration.id);
        if let Err(e) = self.backend.unregister(registration.id) {
            warn!(
                "Failed to unregister hotkey '{}': {}",
                registration.binding.key, e
            );
        }
    }
}

impl Drop for HotkeyRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}

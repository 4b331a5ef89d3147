use super::combo::{HotkeyCombo, Modifier};
use super::error::BindError;
use super::registry::Dispatcher;
use global_hotkey::{
    hotkey::{Code, HotKey, Modifiers},
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// Handle the hotkey system hands out for a registered combo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HotkeyId(pub u32);

/// The OS-level global hotkey facility.
///
/// Only the registry talks to this; presses come back through the listener
/// as `HotkeyId`s.
pub trait HotkeyBackend {
    fn register(&mut self, combo: &HotkeyCombo) -> Result<HotkeyId, BindError>;
    fn unregister(&mut self, id: HotkeyId) -> Result<(), BindError>;
}

/// Backend on top of `global_hotkey::GlobalHotKeyManager`.
///
/// Must be created on the main thread: macOS requires it, and on Windows the
/// window's event loop is what pumps hotkey messages.
pub struct GlobalHotkeyBackend {
    manager: GlobalHotKeyManager,
    registered: HashMap<HotkeyId, (HotKey, String)>,
}

impl GlobalHotkeyBackend {
    pub fn new() -> anyhow::Result<Self> {
        let manager = GlobalHotKeyManager::new()?;
        info!("Global hotkey manager initialized");

        Ok(Self {
            manager,
            registered: HashMap::new(),
        })
    }

    fn to_hotkey(combo: &HotkeyCombo) -> Result<HotKey, BindError> {
        let mut modifiers = Modifiers::empty();
        for modifier in combo.modifiers() {
            modifiers |= match modifier {
                Modifier::Ctrl => Modifiers::CONTROL,
                Modifier::Alt => Modifiers::ALT,
                Modifier::Shift => Modifiers::SHIFT,
                Modifier::Super => Modifiers::SUPER,
            };
        }

        let code = key_to_code(combo.key())
            .ok_or_else(|| BindError::UnsupportedKey(combo.key().to_string()))?;

        let modifiers = (!modifiers.is_empty()).then_some(modifiers);
        Ok(HotKey::new(modifiers, code))
    }
}

impl HotkeyBackend for GlobalHotkeyBackend {
    fn register(&mut self, combo: &HotkeyCombo) -> Result<HotkeyId, BindError> {
        let hotkey = Self::to_hotkey(combo)?;

        self.manager
            .register(hotkey)
            .map_err(|e| BindError::Rejected {
                key: combo.to_string(),
                reason: e.to_string(),
            })?;

        let id = HotkeyId(hotkey.id());
        self.registered.insert(id, (hotkey, combo.to_string()));
        debug!("Registered hotkey {} as {:?}", combo, id);
        Ok(id)
    }

    fn unregister(&mut self, id: HotkeyId) -> Result<(), BindError> {
        let Some((hotkey, key)) = self.registered.remove(&id) else {
            debug!("Hotkey {:?} was not registered", id);
            return Ok(());
        };

        self.manager
            .unregister(hotkey)
            .map_err(|e| BindError::Rejected {
                key: key.clone(),
                reason: e.to_string(),
            })?;

        debug!("Unregistered hotkey {}", key);
        Ok(())
    }
}

/// Stand-in used when the hotkey system could not be started.
///
/// Every registration is rejected with the startup error, so the window can
/// still edit and save the mapping.
pub struct UnavailableBackend {
    reason: String,
}

impl UnavailableBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl HotkeyBackend for UnavailableBackend {
    fn register(&mut self, combo: &HotkeyCombo) -> Result<HotkeyId, BindError> {
        Err(BindError::Rejected {
            key: combo.to_string(),
            reason: self.reason.clone(),
        })
    }

    fn unregister(&mut self, _id: HotkeyId) -> Result<(), BindError> {
        Ok(())
    }
}

/// Forward presses from the global hotkey channel to the dispatcher.
///
/// Folders are opened on this thread, never on the UI thread.
pub fn spawn_listener(dispatcher: Arc<Dispatcher>) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("hotkey-listener".to_string())
        .spawn(move || {
            info!("Hotkey listener thread started");
            let receiver = GlobalHotKeyEvent::receiver();

            while let Ok(event) = receiver.recv() {
                if event.state != HotKeyState::Pressed {
                    continue;
                }
                debug!("Hotkey event received: {:?}", event);
                if dispatcher.dispatch(HotkeyId(event.id)).is_none() {
                    debug!("No folder bound to hotkey id {}", event.id);
                }
            }

            warn!("Hotkey event channel closed, listener stopping");
        })
}

/// Key name (canonical, lowercase) to the code the hotkey system expects.
///
/// Punctuation is only accepted by name; `normalize` turns `-` into `minus`.
pub fn key_to_code(key: &str) -> Option<Code> {
    let code = match key {
        "a" => Code::KeyA,
        "b" => Code::KeyB,
        "c" => Code::KeyC,
        "d" => Code::KeyD,
        "e" => Code::KeyE,
        "f" => Code::KeyF,
        "g" => Code::KeyG,
        "h" => Code::KeyH,
        "i" => Code::KeyI,
        "j" => Code::KeyJ,
        "k" => Code::KeyK,
        "l" => Code::KeyL,
        "m" => Code::KeyM,
        "n" => Code::KeyN,
        "o" => Code::KeyO,
        "p" => Code::KeyP,
        "q" => Code::KeyQ,
        "r" => Code::KeyR,
        "s" => Code::KeyS,
        "t" => Code::KeyT,
        "u" => Code::KeyU,
        "v" => Code::KeyV,
        "w" => Code::KeyW,
        "x" => Code::KeyX,
        "y" => Code::KeyY,
        "z" => Code::KeyZ,
        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,
        "f1" => Code::F1,
        "f2" => Code::F2,
        "f3" => Code::F3,
        "f4" => Code::F4,
        "f5" => Code::F5,
        "f6" => Code::F6,
        "f7" => Code::F7,
        "f8" => Code::F8,
        "f9" => Code::F9,
        "f10" => Code::F10,
        "f11" => Code::F11,
        "f12" => Code::F12,
        "f13" => Code::F13,
        "f14" => Code::F14,
        "f15" => Code::F15,
        "f16" => Code::F16,
        "f17" => Code::F17,
        "f18" => Code::F18,
        "f19" => Code::F19,
        "f20" => Code::F20,
        "f21" => Code::F21,
        "f22" => Code::F22,
        "f23" => Code::F23,
        "f24" => Code::F24,
        "space" => Code::Space,
        "enter" => Code::Enter,
        "tab" => Code::Tab,
        "escape" => Code::Escape,
        "backspace" => Code::Backspace,
        "delete" => Code::Delete,
        "insert" => Code::Insert,
        "home" => Code::Home,
        "end" => Code::End,
        "pageup" => Code::PageUp,
        "pagedown" => Code::PageDown,
        "up" => Code::ArrowUp,
        "down" => Code::ArrowDown,
        "left" => Code::ArrowLeft,
        "right" => Code::ArrowRight,
        "minus" => Code::Minus,
        "equal" => Code::Equal,
        "comma" => Code::Comma,
        "period" => Code::Period,
        "slash" => Code::Slash,
        "backslash" => Code::Backslash,
        "semicolon" => Code::Semicolon,
        "quote" => Code::Quote,
        "backquote" => Code::Backquote,
        "bracketleft" => Code::BracketLeft,
        "bracketright" => Code::BracketRight,
        "printscreen" => Code::PrintScreen,
        "pause" => Code::Pause,
        "num0" => Code::Numpad0,
        "num1" => Code::Numpad1,
        "num2" => Code::Numpad2,
        "num3" => Code::Numpad3,
        "num4" => Code::Numpad4,
        "num5" => Code::Numpad5,
        "num6" => Code::Numpad6,
        "num7" => Code::Numpad7,
        "num8" => Code::Numpad8,
        "num9" => Code::Numpad9,
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_map_to_codes() {
        assert_eq!(key_to_code("a"), Some(Code::KeyA));
        assert_eq!(key_to_code("f12"), Some(Code::F12));
        assert_eq!(key_to_code("escape"), Some(Code::Escape));
        assert_eq!(key_to_code("num5"), Some(Code::Numpad5));
        assert_eq!(key_to_code("minus"), Some(Code::Minus));
        assert_eq!(key_to_code("bracketleft"), Some(Code::BracketLeft));
        assert_eq!(key_to_code("bogus"), None);
    }

    #[test]
    fn test_combo_converts_to_hotkey() {
        let combo = HotkeyCombo::parse("alt+ctrl+c").unwrap();
        let hotkey = GlobalHotkeyBackend::to_hotkey(&combo).unwrap();
        let expected = HotKey::new(Some(Modifiers::CONTROL | Modifiers::ALT), Code::KeyC);
        assert_eq!(hotkey.id(), expected.id());
    }

    #[test]
    fn test_unavailable_backend_rejects_everything() {
        let mut backend = UnavailableBackend::new("no display");
        let combo = HotkeyCombo::parse("ctrl+a").unwrap();
        match backend.register(&combo) {
            Err(BindError::Rejected { key, reason }) => {
                assert_eq!(key, "ctrl+a");
                assert_eq!(reason, "no display");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(backend.unregister(HotkeyId(1)).is_ok());
    }

    #[test]
    fn test_unknown_key_is_unsupported() {
        let combo = HotkeyCombo::parse("ctrl+banana").unwrap();
        assert!(matches!(
            GlobalHotkeyBackend::to_hotkey(&combo),
            Err(BindError::UnsupportedKey(key)) if key == "banana"
        ));
    }
}

use crate::events::{AppEvent, EventSink};
use anyhow::Result;
use tracing::{debug, info};
use tray_icon::{
    menu::{Menu, MenuEvent, MenuId, MenuItem},
    TrayIcon, TrayIconBuilder, TrayIconEvent,
};

const ICON_SIZE: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayMessage {
    Open,
    Exit,
}

/// Tray icon with "Open" and "Exit" entries.
///
/// The tray never touches the mapping or the hotkeys; it only emits
/// `TrayMessage`s through the event sink.
pub struct SystemTray {
    _icon: Option<TrayIcon>,
}

impl SystemTray {
    /// Create the tray icon.
    ///
    /// On Linux the icon lives on its own GTK thread; elsewhere it must be
    /// created on the main thread, which runs the window's event loop.
    pub fn init(events: EventSink) -> Result<Self> {
        info!("Initializing system tray");

        #[cfg(target_os = "linux")]
        {
            let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<(), String>>();

            std::thread::Builder::new()
                .name("tray".to_string())
                .spawn(move || {
                    if let Err(e) = gtk::init() {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                    let _icon = match Self::build(events) {
                        Ok(icon) => icon,
                        Err(e) => {
                            let _ = ready_tx.send(Err(e.to_string()));
                            return;
                        }
                    };
                    let _ = ready_tx.send(Ok(()));
                    gtk::main();
                })?;

            ready_rx
                .recv()?
                .map_err(|e| anyhow::anyhow!("Failed to create tray icon: {}", e))?;
            Ok(Self { _icon: None })
        }

        #[cfg(not(target_os = "linux"))]
        {
            let icon = Self::build(events)?;
            Ok(Self { _icon: Some(icon) })
        }
    }

    fn build(events: EventSink) -> Result<TrayIcon> {
        let menu = Menu::new();
        let open_item = MenuItem::new("Open", true, None);
        menu.append(&open_item)?;
        let exit_item = MenuItem::new("Exit", true, None);
        menu.append(&exit_item)?;

        let icon = tray_icon::Icon::from_rgba(Self::create_default_icon(), ICON_SIZE, ICON_SIZE)?;
        let tray_icon = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip("Quick Folder Finder")
            .with_icon(icon)
            .build()?;

        Self::spawn_forwarder(events, open_item.id().clone(), exit_item.id().clone())?;
        Ok(tray_icon)
    }

    // Menu and icon events arrive on global channels; relay them as
    // AppEvents so the window handles them on its own thread.
    fn spawn_forwarder(events: EventSink, open_id: MenuId, exit_id: MenuId) -> Result<()> {
        std::thread::Builder::new()
            .name("tray-events".to_string())
            .spawn(move || {
                let menu_channel = MenuEvent::receiver();
                let tray_channel = TrayIconEvent::receiver();

                loop {
                    if let Ok(event) = menu_channel.try_recv() {
                        if let Some(message) = Self::menu_message(&event.id, &open_id, &exit_id) {
                            info!("Tray menu: {:?}", message);
                            events.send(AppEvent::Tray(message));
                        }
                    }

                    if let Ok(event) = tray_channel.try_recv() {
                        if let TrayIconEvent::DoubleClick { .. } = event {
                            debug!("Tray icon double-clicked");
                            events.send(AppEvent::Tray(TrayMessage::Open));
                        }
                    }

                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            })?;
        Ok(())
    }

    fn menu_message(id: &MenuId, open_id: &MenuId, exit_id: &MenuId) -> Option<TrayMessage> {
        if id == open_id {
            Some(TrayMessage::Open)
        } else if id == exit_id {
            Some(TrayMessage::Exit)
        } else {
            None
        }
    }

    /// White square with a blue disc in the middle, RGBA
    fn create_default_icon() -> Vec<u8> {
        let size = ICON_SIZE as usize;
        let center = size as f32 / 2.0;
        let radius = size as f32 / 4.0;
        let mut rgba = Vec::with_capacity(size * size * 4);

        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 + 0.5 - center;
                let dy = y as f32 + 0.5 - center;
                if dx * dx + dy * dy <= radius * radius {
                    rgba.extend_from_slice(&[0, 128, 255, 255]);
                } else {
                    rgba.extend_from_slice(&[255, 255, 255, 255]);
                }
            }
        }

        rgba
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(rgba: &[u8], x: usize, y: usize) -> &[u8] {
        let offset = (y * ICON_SIZE as usize + x) * 4;
        &rgba[offset..offset + 4]
    }

    #[test]
    fn test_icon_is_blue_disc_on_white() {
        let rgba = SystemTray::create_default_icon();
        assert_eq!(rgba.len(), (ICON_SIZE * ICON_SIZE * 4) as usize);
        assert_eq!(pixel(&rgba, 32, 32), &[0, 128, 255, 255]);
        assert_eq!(pixel(&rgba, 0, 0), &[255, 255, 255, 255]);
        assert_eq!(pixel(&rgba, 63, 32), &[255, 255, 255, 255]);
    }

    #[test]
    fn test_menu_ids_map_to_messages() {
        let open_id = MenuId::new("open");
        let exit_id = MenuId::new("exit");

        assert_eq!(SystemTray::menu_message(&open_id, &open_id, &exit_id), Some(TrayMessage::Open));
        assert_eq!(SystemTray::menu_message(&exit_id, &open_id, &exit_id), Some(TrayMessage::Exit));
        assert_eq!(SystemTray::menu_message(&MenuId::new("other"), &open_id, &exit_id), None);
    }
}

use crate::events::{AppEvent, EventSink};
use crate::ui::controller::{AppController, StatusKind, WindowAction};
use crate::ui::notifications::NotificationManager;
use crate::ui::tray::SystemTray;
use anyhow::Result;
use eframe::egui::{self, Color32, RichText};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const TITLE: &str = "Quick Folder Finder - Hotkey Management for Folders";

/// Open the main window and block until it closes
pub fn run(
    mut controller: AppController,
    events: mpsc::UnboundedReceiver<AppEvent>,
    sink: EventSink,
) -> Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(TITLE)
            .with_inner_size([900.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        TITLE,
        native_options,
        Box::new(move |cc| {
            let ctx = cc.egui_ctx.clone();
            sink.set_waker(move || ctx.request_repaint());

            // Created once the event loop exists; macOS requires it.
            let tray = match SystemTray::init(sink.clone()) {
                Ok(tray) => Some(tray),
                Err(e) => {
                    warn!("System tray unavailable, minimizing will not hide the window: {}", e);
                    None
                }
            };
            controller.set_tray_available(tray.is_some());

            Ok(Box::new(FolderWindow {
                controller,
                events,
                notifications: NotificationManager::new(),
                _tray: tray,
                closing: false,
                told_about_tray: false,
            }))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Window failed: {}", e))?;

    info!("Main window closed");
    Ok(())
}

struct FolderWindow {
    controller: AppController,
    events: mpsc::UnboundedReceiver<AppEvent>,
    notifications: NotificationManager,
    _tray: Option<SystemTray>,
    closing: bool,
    told_about_tray: bool,
}

impl FolderWindow {
    fn apply(&mut self, ctx: &egui::Context, action: WindowAction) {
        match action {
            WindowAction::None => return,
            WindowAction::HideToTray if !self.told_about_tray => {
                self.notifications.notify_hidden_to_tray();
                self.told_about_tray = true;
            }
            WindowAction::Close => self.closing = true,
            _ => {}
        }
        for command in viewport_commands(action) {
            ctx.send_viewport_cmd(command);
        }
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.events.try_recv() {
            if let AppEvent::LaunchFailed { path, message, .. } = &event {
                if self.controller.is_hidden() {
                    self.notifications.notify_launch_failed(path, message);
                }
            }
            let action = self.controller.handle_event(event);
            self.apply(ctx, action);
        }
    }

    fn handle_window_state(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.viewport().close_requested()) && !self.closing {
            self.closing = true;
            self.controller.on_close();
        }

        match ctx.input(|i| i.viewport().minimized) {
            Some(true) if !self.closing => {
                let action = self.controller.on_minimize();
                self.apply(ctx, action);
            }
            // Hidden windows stay minimized where they are not made invisible
            Some(false) if HIDE_BY_MINIMIZING && self.controller.is_hidden() => {
                self.controller.on_restored();
            }
            _ => {}
        }

        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        for path in dropped {
            if path.is_dir() {
                self.controller.add_row(path.display().to_string());
            } else {
                debug!("Ignoring dropped non-folder {:?}", path);
            }
        }
    }
}

/// Windows and macOS stop redrawing invisible windows, and events are only
/// drained while frames run. There the window is kept minimized instead of
/// invisible so tray and Ctrl+C events still get through.
const HIDE_BY_MINIMIZING: bool = cfg!(any(target_os = "windows", target_os = "macos"));

fn viewport_commands(action: WindowAction) -> Vec<egui::ViewportCommand> {
    match action {
        WindowAction::None => Vec::new(),
        WindowAction::Show => vec![
            egui::ViewportCommand::Visible(true),
            egui::ViewportCommand::Minimized(false),
            egui::ViewportCommand::Focus,
        ],
        WindowAction::HideToTray if HIDE_BY_MINIMIZING => {
            vec![egui::ViewportCommand::Minimized(true)]
        }
        WindowAction::HideToTray => vec![egui::ViewportCommand::Visible(false)],
        WindowAction::Close => vec![egui::ViewportCommand::Close],
    }
}

fn status_color(kind: StatusKind) -> Color32 {
    match kind {
        StatusKind::Success => Color32::from_rgb(0, 128, 0),
        StatusKind::Error => Color32::RED,
        StatusKind::Info => Color32::from_rgb(0, 0, 255),
    }
}

impl eframe::App for FolderWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events(ctx);
        self.handle_window_state(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("Select a folder:").size(14.0));
                if ui.button(RichText::new("Select Folder").size(14.0)).clicked() {
                    self.controller.add_row("");
                }
                ui.label(
                    "Select a folder and assign a hotkey.\nEx: a, alt+b, ctrl+c, shift+d.\n\
                     Folders dropped onto this window are added too.",
                );
                if let Some(status) = self.controller.status() {
                    ui.label(
                        RichText::new(status.text.as_str())
                            .color(status_color(status.kind))
                            .size(14.0),
                    );
                }
            });

            ui.separator();

            let mut assign = None;
            let mut delete = None;
            egui::ScrollArea::vertical().show(ui, |ui| {
                for (index, row) in self.controller.rows_mut().iter_mut().enumerate() {
                    ui.horizontal(|ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut row.path)
                                .desired_width(480.0)
                                .hint_text("Folder path"),
                        );
                        ui.add(
                            egui::TextEdit::singleline(&mut row.key)
                                .desired_width(180.0)
                                .hint_text("Hotkey"),
                        );
                        if ui.button("Assign Key").clicked() {
                            assign = Some(index);
                        }
                        if ui.button("Delete").clicked() {
                            delete = Some(index);
                        }
                    });
                }
            });

            if let Some(index) = assign {
                self.controller.assign_row(index);
            }
            if let Some(index) = delete {
                self.controller.delete_row(index);
            }
        });
    }
}

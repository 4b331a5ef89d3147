use crate::ui::tray::TrayMessage;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Events delivered to the window from background threads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    FolderOpened { key: String, path: String },
    LaunchFailed { key: String, path: String, message: String },
    Tray(TrayMessage),
    ExitRequested,
}

type Waker = Box<dyn Fn() + Send + Sync>;

/// Sending half of the event channel.
///
/// Background threads never touch window state; they push an event here and
/// the window drains the receiver on its own thread. The optional waker asks
/// the window to run a frame so queued events are seen while it is idle.
#[derive(Clone)]
pub struct EventSink {
    sender: mpsc::UnboundedSender<AppEvent>,
    waker: Arc<OnceCell<Waker>>,
}

impl EventSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let sink = Self {
            sender,
            waker: Arc::new(OnceCell::new()),
        };
        (sink, receiver)
    }

    /// Install the callback that wakes the UI thread. Only the first call wins.
    pub fn set_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        if self.waker.set(Box::new(waker)).is_err() {
            debug!("Event waker already installed");
        }
    }

    pub fn send(&self, event: AppEvent) {
        if self.sender.send(event).is_err() {
            debug!("Event receiver dropped");
            return;
        }
        if let Some(wake) = self.waker.get() {
            wake();
        }
    }
}

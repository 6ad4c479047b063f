use crate::integration::{AppCommand, AppEvent};
use crossbeam_channel::{bounded, Receiver, Sender};

/// Both directions between the UI thread and the orchestrator worker
pub struct AppChannels {
    pub command_tx: Sender<AppCommand>,
    pub command_rx: Receiver<AppCommand>,
    pub event_tx: Sender<AppEvent>,
    pub event_rx: Receiver<AppEvent>,
}

impl AppChannels {
    pub fn new(buffer_size: usize) -> Self {
        let (command_tx, command_rx) = bounded(buffer_size);
        let (event_tx, event_rx) = bounded(buffer_size);

        Self {
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        }
    }
}

impl Default for AppChannels {
    fn default() -> Self {
        Self::new(100)
    }
}

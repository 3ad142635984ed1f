use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use super::types::Command;

/// Parameter changes queued by the console, drained by the output callback
/// at the start of each block
pub struct CommandBus {
    tx: Sender<Command>,
    rx: Receiver<Command>,
}

impl CommandBus {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self { tx, rx }
    }

    /// Handle for the control thread
    pub fn sender(&self) -> CommandSender {
        CommandSender {
            tx: self.tx.clone(),
        }
    }

    /// Handle moved into the output stream callback
    pub fn receiver(&self) -> CommandReceiver {
        CommandReceiver {
            rx: self.rx.clone(),
        }
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct CommandSender {
    tx: Sender<Command>,
}

impl CommandSender {
    /// Queue a parameter change. Never waits: a full queue drops the command
    /// and returns false.
    pub fn send(&self, cmd: Command) -> bool {
        match self.tx.try_send(cmd) {
            Ok(()) => true,
            Err(TrySendError::Full(cmd)) => {
                eprintln!("Warning: command queue full, dropping '{}'", cmd.description());
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

#[derive(Clone)]
pub struct CommandReceiver {
    rx: Receiver<Command>,
}

impl CommandReceiver {
    /// Next pending change, if any. Safe to call from the audio thread.
    pub fn try_recv(&self) -> Option<Command> {
        self.rx.try_recv().ok()
    }
}

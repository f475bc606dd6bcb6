//! Scripted host event source for tests and the headless driver.
//!
//! Replays a fixed list of [`HostEvent`]s and then closes the stream, as if
//! the host window had been closed.

use tokio::sync::mpsc;

use super::{HostEvent, HostEventSource, HostSourceError};

pub struct ScriptedHostSource {
    script: Option<Vec<HostEvent>>,
}

impl ScriptedHostSource {
    pub fn new(script: Vec<HostEvent>) -> Self {
        Self {
            script: Some(script),
        }
    }
}

impl HostEventSource for ScriptedHostSource {
    fn start(&mut self) -> Result<mpsc::UnboundedReceiver<HostEvent>, HostSourceError> {
        let script = self.script.take().ok_or(HostSourceError::AlreadyStarted)?;
        let (tx, rx) = mpsc::unbounded_channel();
        for event in script {
            // The receiver is still in scope, so sending cannot fail.
            let _ = tx.send(event);
        }
        Ok(rx)
    }
}

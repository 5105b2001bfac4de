use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use warden::errors::WardenError;
use warden::oracle::Oracle;
use warden::transport::Transport;

/// Transport that keeps every outbound message.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts sent to `destination`, in order.
    pub fn texts_to(&self, destination: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(dest, _)| dest == destination)
            .map(|(_, text)| text)
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, destination: &str, text: &str) -> Result<(), WardenError> {
        self.sent
            .lock()
            .unwrap()
            .push((destination.to_string(), text.to_string()));
        Ok(())
    }
}

/// Oracle that records status queries instead of sending them.
#[derive(Default)]
pub struct RecordingOracle {
    queries: Mutex<Vec<String>>,
    unavailable: AtomicBool,
}

impl RecordingOracle {
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl Oracle for RecordingOracle {
    fn send_status_query(&self, user: &str) -> Result<(), WardenError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(WardenError::Transport("not connected".into()));
        }
        self.queries.lock().unwrap().push(user.to_string());
        Ok(())
    }
}

//! Status delivery to listeners.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use super::types::PipelineStatus;

pub type ListenerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Receives status events as a run progresses.
pub trait StatusListener: Send + Sync {
    fn on_status(&self, status: &PipelineStatus) -> ListenerResult;
}

impl<F> StatusListener for F
where
    F: Fn(&PipelineStatus) -> ListenerResult + Send + Sync,
{
    fn on_status(&self, status: &PipelineStatus) -> ListenerResult {
        self(status)
    }
}

/// Fans status events out to every listener, one event at a time, in
/// registration order, and keeps the history of the run.
///
/// A listener that errors or panics is logged and skipped; delivery to the
/// remaining listeners continues.
#[derive(Default)]
pub struct StatusHub {
    listeners: Vec<Arc<dyn StatusListener>>,
    history: Mutex<Vec<PipelineStatus>>,
}

impl StatusHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Arc<dyn StatusListener>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, status: PipelineStatus) {
        // The history lock doubles as the delivery lock.
        let mut history = match self.history.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        match &status.error {
            Some(error) => warn!(stage = %status.stage, "{}: {}", status.message, error),
            None => info!(stage = %status.stage, progress = status.progress, "{}", status.message),
        }

        for (i, listener) in self.listeners.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| listener.on_status(&status))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Status listener {} failed: {}", i, e),
                Err(_) => warn!("Status listener {} panicked", i),
            }
        }

        history.push(status);
    }

    pub fn history(&self) -> Vec<PipelineStatus> {
        match self.history.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Messages of every event so far, errors included.
    pub fn messages(&self) -> Vec<String> {
        self.history()
            .into_iter()
            .map(|status| match status.error {
                Some(error) => format!("[{}] {}: {}", status.stage, status.message, error),
                None => format!("[{}] {}", status.stage, status.message),
            })
            .collect()
    }

    pub fn clear(&self) {
        match self.history.lock() {
            Ok(mut guard) => guard.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

//! Shared busy/error status for asynchronous work.
//!
//! One tracker is created at startup and handed to everything that needs
//! a busy or error indicator. It carries no per-operation identity: while any
//! operation is running the app is "busy", and the last error wins.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, watch};

use crate::error::AppError;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub message: String,
}

impl ErrorInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&AppError> for ErrorInfo {
    fn from(err: &AppError) -> Self {
        Self::new(err.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AsyncStatus {
    /// App-level loading flag, cleared by `app_loaded`.
    pub busy: bool,
    /// Action indicator, cleared by `finish`.
    pub action_in_flight: bool,
    pub error: Option<ErrorInfo>,
    pub initialized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    Start,
    Error(ErrorInfo),
    Finish,
    AppLoaded,
}

struct Shared {
    state: watch::Sender<AsyncStatus>,
    events: broadcast::Sender<StatusEvent>,
}

/// Cloneable handle; all clones observe and mutate the same status.
#[derive(Clone)]
pub struct StatusTracker {
    shared: Arc<Shared>,
}

impl StatusTracker {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AsyncStatus::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared { state, events }),
        }
    }

    pub fn start(&self) {
        self.apply(StatusEvent::Start);
    }

    pub fn error(&self, info: ErrorInfo) {
        self.apply(StatusEvent::Error(info));
    }

    pub fn finish(&self) {
        self.apply(StatusEvent::Finish);
    }

    pub fn app_loaded(&self) {
        self.apply(StatusEvent::AppLoaded);
    }

    pub fn snapshot(&self) -> AsyncStatus {
        self.shared.state.borrow().clone()
    }

    /// Receiver that always holds the latest status.
    pub fn subscribe(&self) -> watch::Receiver<AsyncStatus> {
        self.shared.state.subscribe()
    }

    /// Receiver for every transition from now on.
    pub fn events(&self) -> broadcast::Receiver<StatusEvent> {
        self.shared.events.subscribe()
    }

    fn apply(&self, event: StatusEvent) {
        tracing::debug!(?event, "async status transition");

        self.shared.state.send_modify(|status| match &event {
            StatusEvent::Start => {
                status.busy = true;
                status.action_in_flight = true;
            }
            StatusEvent::Error(info) => {
                status.error = Some(info.clone());
            }
            StatusEvent::Finish => {
                status.action_in_flight = false;
            }
            StatusEvent::AppLoaded => {
                status.busy = false;
                status.initialized = true;
            }
        });

        // Nobody listening is fine
        let _ = self.shared.events.send(event);
    }
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

//! Established remote sessions
//!
//! A [`ClientSession`] is the only artifact a successful pipeline run hands
//! back. It owns the connected signal strategy and the initialized endpoint
//! until [`ClientSession::close`] releases them. A session dropped without
//! `close` still releases both, but the listener is not told.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::capability::Capability;
use crate::endpoint::{EndpointState, ManagedEndpoint};
use crate::events::{SessionEventHandler, SessionState};
use crate::signaling::{SignalState, SignalStrategy};

/// Unique identifier for a client session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where session telemetry is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoggingPath {
    /// Log entries travel over the signaling channel
    #[default]
    SignalChannel,
    /// Log entries are posted to the REST logging API
    RestApi,
}

impl LoggingPath {
    pub fn from_flag(use_alternate_logging_path: bool) -> Self {
        if use_alternate_logging_path {
            LoggingPath::RestApi
        } else {
            LoggingPath::SignalChannel
        }
    }
}

/// A live remote session
pub struct ClientSession {
    id: SessionId,
    endpoint: ManagedEndpoint,
    signal_strategy: Box<dyn SignalStrategy>,
    logging_path: LoggingPath,
    listener: Arc<dyn SessionEventHandler>,
    state: SessionState,
    created_at: DateTime<Utc>,
    released: bool,
}

impl fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSession")
            .field("id", &self.id)
            .field("endpoint", &self.endpoint)
            .field("signal_state", &self.signal_strategy.state())
            .field("logging_path", &self.logging_path)
            .field("state", &self.state)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

impl ClientSession {
    pub(crate) fn new(
        endpoint: ManagedEndpoint,
        signal_strategy: Box<dyn SignalStrategy>,
        logging_path: LoggingPath,
        listener: Arc<dyn SessionEventHandler>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            endpoint,
            signal_strategy,
            logging_path,
            listener,
            state: SessionState::Connected,
            created_at: Utc::now(),
            released: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn logging_path(&self) -> LoggingPath {
        self.logging_path
    }

    pub fn signal_state(&self) -> SignalState {
        self.signal_strategy.state()
    }

    pub fn endpoint_state(&self) -> EndpointState {
        self.endpoint.state()
    }

    pub fn has_capability(&self, capability: &Capability) -> bool {
        self.endpoint.has_capability(capability)
    }

    pub fn listener(&self) -> &Arc<dyn SessionEventHandler> {
        &self.listener
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Tear the session down: dispose the strategy, then the endpoint, and
    /// tell the listener the session is closed.
    pub async fn close(mut self) {
        self.release();

        let old_state = self.state;
        self.state = SessionState::Closed;
        info!(session_id = %self.id, "remote session closed");
        self.listener
            .on_session_state_changed(self.id, old_state, self.state)
            .await;
    }

    /// Dispose the strategy, then the endpoint, at most once per session
    fn release(&mut self) -> bool {
        if std::mem::replace(&mut self.released, true) {
            return false;
        }
        self.signal_strategy.dispose();
        self.endpoint.dispose();
        true
    }
}

impl Drop for ClientSession {
    fn drop(&mut self) {
        if self.release() {
            debug!(session_id = %self.id, "remote session dropped without close, resources released");
        }
    }
}

//! Signaling strategy contract and state tracking
//!
//! A [`SignalStrategy`] owns one signaling connection. Its state is published
//! through a `tokio::sync::watch` channel rather than a registered callback, so
//! a subscriber always sees the latest state even if the transition happened
//! before it started waiting.
//!
//! ```text
//! NotConnected ──► Connecting ──► Handshake ──► Connected
//!       │              │              │             │
//!       └──────────────┴──────┬───────┴─────────────┘
//!                             ▼
//!                      Failed │ Closed   (terminal)
//! ```
//!
//! Implementations embed a [`SignalStateCell`] to get the transition rules, the
//! terminal error slot and idempotent disposal for free.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

/// Connection state of a signaling strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalState {
    NotConnected,
    Connecting,
    Handshake,
    Connected,
    Failed,
    Closed,
}

impl SignalState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SignalState::Failed | SignalState::Closed)
    }

    /// Whether moving from `self` to `next` is a legal forward transition
    pub fn can_transition_to(&self, next: SignalState) -> bool {
        use SignalState::*;
        match (*self, next) {
            (Failed, _) | (Closed, _) => false,
            (_, Failed) | (_, Closed) => true,
            (NotConnected, Connecting) => true,
            (Connecting, Handshake) | (Connecting, Connected) => true,
            (Handshake, Connected) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalState::NotConnected => "NOT_CONNECTED",
            SignalState::Connecting => "CONNECTING",
            SignalState::Handshake => "HANDSHAKE",
            SignalState::Connected => "CONNECTED",
            SignalState::Failed => "FAILED",
            SignalState::Closed => "CLOSED",
        };
        f.write_str(name)
    }
}

/// Terminal error reported by a signaling strategy
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignalingError {
    #[error("signaling server rejected credentials: {reason}")]
    AuthenticationRejected { reason: String },

    #[error("signaling network error: {reason}")]
    Network { reason: String },

    #[error("signaling protocol error: {reason}")]
    Protocol { reason: String },

    #[error("signaling channel closed before it connected")]
    ClosedBeforeConnect,

    /// The strategy dropped its state publisher
    #[error("signaling strategy detached before reaching a terminal state")]
    Detached,

    #[error("signaling failed without reporting an error")]
    Unspecified,
}

impl SignalingError {
    pub fn authentication_rejected(reason: impl Into<String>) -> Self {
        Self::AuthenticationRejected { reason: reason.into() }
    }

    pub fn network(reason: impl Into<String>) -> Self {
        Self::Network { reason: reason.into() }
    }

    pub fn protocol(reason: impl Into<String>) -> Self {
        Self::Protocol { reason: reason.into() }
    }
}

/// A signaling connection driven by an external signaling subsystem
pub trait SignalStrategy: Send + Sync {
    /// Subscribe to state changes; the receiver starts at the current state
    fn watch_state(&self) -> watch::Receiver<SignalState>;

    fn state(&self) -> SignalState {
        *self.watch_state().borrow()
    }

    /// Start connecting; progress is reported through [`Self::watch_state`]
    fn connect(&self, server: &str, username: &str, auth_token: &str);

    /// The terminal error, available once the state is `Failed`
    fn error(&self) -> Option<SignalingError>;

    /// Release the connection. Must be safe to call more than once.
    fn dispose(&self);
}

/// Creates a fresh [`SignalStrategy`] for each pipeline run
pub trait SignalStrategyFactory: Send + Sync {
    fn create_strategy(&self) -> Box<dyn SignalStrategy>;
}

/// State holder shared by signal strategy implementations
#[derive(Debug)]
pub struct SignalStateCell {
    state: watch::Sender<SignalState>,
    error: Mutex<Option<SignalingError>>,
    disposed: AtomicBool,
}

impl Default for SignalStateCell {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalStateCell {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SignalState::NotConnected);
        Self {
            state,
            error: Mutex::new(None),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SignalState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> SignalState {
        *self.state.borrow()
    }

    /// Apply a transition if it is legal; returns whether it was applied
    pub fn transition(&self, next: SignalState) -> bool {
        let mut from = None;
        let applied = self.state.send_if_modified(|current| {
            if current.can_transition_to(next) {
                from = Some(*current);
                *current = next;
                true
            } else {
                false
            }
        });

        match from {
            Some(from) => debug!(%from, to = %next, "signal state changed"),
            None => warn!(current = %self.current(), rejected = %next, "ignoring illegal signal state transition"),
        }
        applied
    }

    /// Record `error` and move to `Failed`. The error is stored before the
    /// state is published.
    ///
    /// The slot is written inside the state update, so a concurrent
    /// `dispose` either lands first and the error is dropped, or lands after
    /// and sees `Failed`.
    pub fn fail(&self, error: SignalingError) -> bool {
        let mut from = None;
        let applied = self.state.send_if_modified(|current| {
            if !current.can_transition_to(SignalState::Failed) {
                return false;
            }
            *self.error.lock() = Some(error.clone());
            from = Some(*current);
            *current = SignalState::Failed;
            true
        });

        match from {
            Some(from) => debug!(%from, %error, "signal strategy failed"),
            None => trace!(%error, "signal strategy already terminal, dropping error"),
        }
        applied
    }

    pub fn error(&self) -> Option<SignalingError> {
        self.error.lock().clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Mark the strategy disposed, closing it if still live. Returns `false`
    /// when it was already disposed.
    pub fn dispose(&self) -> bool {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return false;
        }
        if !self.current().is_terminal() {
            self.transition(SignalState::Closed);
        }
        true
    }
}

/// Connect `strategy` and wait for its first terminal outcome.
///
/// The state receiver is taken before `connect` is called so no transition
/// can be missed.
pub async fn await_connected(
    strategy: &dyn SignalStrategy,
    server: &str,
    username: &str,
    auth_token: &str,
) -> Result<(), SignalingError> {
    let mut states = strategy.watch_state();
    strategy.connect(server, username, auth_token);

    loop {
        let state = *states.borrow_and_update();
        match state {
            SignalState::Connected => return Ok(()),
            SignalState::Failed => {
                return Err(strategy.error().unwrap_or(SignalingError::Unspecified));
            }
            SignalState::Closed => return Err(SignalingError::ClosedBeforeConnect),
            pending => trace!(state = %pending, "waiting for signaling"),
        }

        if states.changed().await.is_err() {
            return Err(SignalingError::Detached);
        }
    }
}

//! Session event handling
//!
//! The listener handed to `create_session` implements [`SessionEventHandler`].
//! The establishment pipeline never calls it; it is passed through unchanged
//! and only the constructed [`ClientSession`](crate::ClientSession) reports
//! events to it.
//!
//! ```rust
//! use remoting_core::events::{SessionEventHandler, SessionState};
//! use remoting_core::SessionId;
//! use async_trait::async_trait;
//!
//! struct PrintingHandler;
//!
//! #[async_trait]
//! impl SessionEventHandler for PrintingHandler {
//!     async fn on_session_state_changed(&self, id: SessionId, old: SessionState, new: SessionState) {
//!         println!("session {} {:?} -> {:?}", id, old, new);
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::session::SessionId;

/// Lifecycle of an established session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Connected,
    Closed,
}

/// Receives events from an established session
#[async_trait]
pub trait SessionEventHandler: Send + Sync {
    async fn on_session_state_changed(
        &self,
        session_id: SessionId,
        old_state: SessionState,
        new_state: SessionState,
    );
}

/// Handler that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventHandler;

#[async_trait]
impl SessionEventHandler for NoopEventHandler {
    async fn on_session_state_changed(&self, _: SessionId, _: SessionState, _: SessionState) {}
}

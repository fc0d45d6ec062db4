//! Remoting-core: remote session establishment
//!
//! This crate turns a signed-in user into a live remote session by driving a
//! strictly ordered handshake across independent collaborators:
//!
//! ```text
//! IdentityProvider ──► SignalStrategy ──► ClientEndpoint ──► ClientSession
//!   token + email       wait Connected     load + version
//! ```
//!
//! The collaborators are traits; the crate supplies the orchestration, the
//! lifecycle bookkeeping around each collaborator, and a single error type.
//!
//! Remoting-core focuses on:
//! - Sequencing the identity, signaling and endpoint stages
//! - Releasing everything acquired when any stage fails or is cancelled
//! - Tracking signaling and endpoint lifecycle states
//! - Handing the connected resources to a [`ClientSession`]
//!
//! The identity service, the signaling wire protocol and the endpoint's
//! media/control implementation live outside this crate.

pub mod capability;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod events;
pub mod factory;
pub mod identity;
pub mod logging;
pub mod session;
pub mod signaling;

pub use capability::Capability;
pub use config::FactoryConfig;
pub use endpoint::{ClientEndpoint, EndpointContainer, EndpointFactory, EndpointState, ManagedEndpoint};
pub use error::{ErrorTag, SessionError, SessionResult};
pub use events::{SessionEventHandler, SessionState};
pub use factory::{SessionFactory, SessionFactoryBuilder, Stage};
pub use identity::{Credentials, IdentityError, IdentityProvider, UserInfo};
pub use session::{ClientSession, LoggingPath, SessionId};
pub use signaling::{
    await_connected, SignalState, SignalStateCell, SignalStrategy, SignalStrategyFactory,
    SignalingError,
};

// Re-exported so callers can cancel without depending on tokio-util directly
pub use tokio_util::sync::CancellationToken;

/// Remoting-core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

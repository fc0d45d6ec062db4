//! Client endpoint contract and lifecycle wrapper
//!
//! The client endpoint is the component that carries the remote session's
//! media and control traffic. It is constructed synchronously by an
//! [`EndpointFactory`] and then initialized asynchronously. [`ManagedEndpoint`]
//! wraps it with the lifecycle the pipeline relies on:
//!
//! ```text
//! Uninitialized ──► Initializing ──► Initialized
//!                         │
//!                         └────────► InitFailed
//!
//! any state ──dispose()──► Disposed
//! ```

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::capability::Capability;
use crate::error::{SessionError, SessionResult};

/// Host the endpoint is attached to. Owned by the caller.
pub trait EndpointContainer: Send + Sync + fmt::Debug {
    /// Identifier of the container, used for logging
    fn id(&self) -> &str;
}

/// Transport/control endpoint for a remote session
#[async_trait]
pub trait ClientEndpoint: Send + Sync {
    /// Load the endpoint. Resolves once with whether it loaded.
    async fn initialize(&self) -> bool;

    /// Whether the loaded endpoint speaks a supported version
    fn is_supported_version(&self) -> bool;

    /// Whether the endpoint negotiated `capability`
    fn has_feature(&self, capability: &Capability) -> bool;

    /// Release the endpoint
    fn dispose(&self);
}

/// Constructs endpoints bound to a container and capability set
pub trait EndpointFactory: Send + Sync {
    fn create_endpoint(
        &self,
        container: &dyn EndpointContainer,
        capabilities: &[Capability],
    ) -> Box<dyn ClientEndpoint>;
}

/// Lifecycle state of a [`ManagedEndpoint`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndpointState {
    Uninitialized,
    Initializing,
    Initialized,
    InitFailed,
    Disposed,
}

/// An endpoint plus the lifecycle bookkeeping around it
pub struct ManagedEndpoint {
    inner: Box<dyn ClientEndpoint>,
    state: EndpointState,
}

impl fmt::Debug for ManagedEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedEndpoint")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ManagedEndpoint {
    pub fn new(inner: Box<dyn ClientEndpoint>) -> Self {
        Self {
            inner,
            state: EndpointState::Uninitialized,
        }
    }

    pub fn state(&self) -> EndpointState {
        self.state
    }

    /// Load the endpoint and check its version.
    ///
    /// The version is only queried after a successful load. A failed load
    /// yields `MissingEndpoint`, a bad version `UnsupportedVersion`; either way
    /// the endpoint ends in `InitFailed` and the caller still owns it.
    pub async fn initialize(&mut self) -> SessionResult<()> {
        if self.state != EndpointState::Uninitialized {
            return Err(SessionError::internal(format!(
                "endpoint initialize called in state {:?}",
                self.state
            )));
        }

        self.state = EndpointState::Initializing;
        debug!("initializing client endpoint");

        if !self.inner.initialize().await {
            error!("client endpoint not loaded");
            self.state = EndpointState::InitFailed;
            return Err(SessionError::MissingEndpoint);
        }

        if !self.inner.is_supported_version() {
            error!("client endpoint version not supported");
            self.state = EndpointState::InitFailed;
            return Err(SessionError::UnsupportedVersion);
        }

        self.state = EndpointState::Initialized;
        Ok(())
    }

    pub fn has_capability(&self, capability: &Capability) -> bool {
        self.state == EndpointState::Initialized && self.inner.has_feature(capability)
    }

    /// Release the endpoint once. Returns `false` if it was already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.state == EndpointState::Disposed {
            return false;
        }
        self.inner.dispose();
        self.state = EndpointState::Disposed;
        debug!("client endpoint disposed");
        true
    }
}

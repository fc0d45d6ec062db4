//! Pipeline stages and the resources they acquire
//!
//! Each stage is a plain function from the previous stage's output to the next
//! input. Resources a stage acquires are parked in [`PendingResources`] before
//! the stage awaits anything, so an abort at any point (error, cancellation or
//! the caller dropping the future) can release them.

use tracing::{debug, warn};

use crate::capability::Capability;
use crate::endpoint::{EndpointContainer, EndpointFactory, ManagedEndpoint};
use crate::error::{SessionError, SessionResult};
use crate::identity::{Credentials, IdentityProvider};
use crate::signaling::{await_connected, SignalStrategy};

/// Resources acquired by one pipeline run and not yet handed to a session
#[derive(Default)]
pub(crate) struct PendingResources {
    pub(crate) strategy: Option<Box<dyn SignalStrategy>>,
    pub(crate) endpoint: Option<ManagedEndpoint>,
}

impl PendingResources {
    /// Dispose whatever is held: the strategy first, then the endpoint.
    /// Anything already taken or released is skipped.
    pub(crate) fn release(&mut self) {
        if let Some(strategy) = self.strategy.take() {
            debug!("releasing signal strategy");
            strategy.dispose();
        }
        if let Some(mut endpoint) = self.endpoint.take() {
            debug!("releasing client endpoint");
            endpoint.dispose();
        }
    }

    /// Take both resources for hand-off. Leaves everything in place unless
    /// both are present.
    pub(crate) fn take_established(&mut self) -> Option<(Box<dyn SignalStrategy>, ManagedEndpoint)> {
        match (self.strategy.take(), self.endpoint.take()) {
            (Some(strategy), Some(endpoint)) => Some((strategy, endpoint)),
            (strategy, endpoint) => {
                self.strategy = strategy;
                self.endpoint = endpoint;
                None
            }
        }
    }
}

impl Drop for PendingResources {
    fn drop(&mut self) {
        self.release();
    }
}

/// Identity stage: token, then the user it belongs to
pub(crate) async fn authenticate(identity: &dyn IdentityProvider) -> SessionResult<Credentials> {
    let token = identity.get_token().await.map_err(|e| {
        warn!(error = %e, "token request failed");
        SessionError::auth_failed(e.to_string())
    })?;

    let user = identity.get_user_info().await.map_err(|e| {
        warn!(error = %e, "user info request failed");
        SessionError::auth_failed(e.to_string())
    })?;

    Ok(Credentials { token, user })
}

/// Signaling stage: connect as the signed-in user and wait for `Connected`
pub(crate) async fn connect_signaling(
    strategy: &dyn SignalStrategy,
    server: &str,
    credentials: &Credentials,
) -> SessionResult<()> {
    await_connected(strategy, server, &credentials.user.email, &credentials.token)
        .await
        .map_err(|e| {
            warn!(error = %e, server, "signaling failed");
            SessionError::SignalingFailed(e)
        })
}

/// Endpoint creation stage. Construction is synchronous and cannot fail.
pub(crate) fn create_endpoint(
    endpoints: &dyn EndpointFactory,
    container: &dyn EndpointContainer,
    capabilities: &[Capability],
) -> ManagedEndpoint {
    ManagedEndpoint::new(endpoints.create_endpoint(container, capabilities))
}

/// Endpoint initialization stage: load, then version check
pub(crate) async fn initialize_endpoint(endpoint: &mut ManagedEndpoint) -> SessionResult<()> {
    endpoint.initialize().await
}

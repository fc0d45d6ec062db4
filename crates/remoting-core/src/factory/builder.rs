//! Builder for [`SessionFactory`]

use std::sync::Arc;

use crate::capability::Capability;
use crate::config::FactoryConfig;
use crate::endpoint::{EndpointContainer, EndpointFactory};
use crate::error::{SessionError, SessionResult};
use crate::identity::IdentityProvider;
use crate::signaling::SignalStrategyFactory;

use super::SessionFactory;

/// Fluent builder for a [`SessionFactory`]
///
/// The container and the three collaborator factories are required; the
/// configuration falls back to [`FactoryConfig::default`].
///
/// ```rust,no_run
/// # use remoting_core::*;
/// # use std::sync::Arc;
/// # fn example(
/// #     container: Arc<dyn EndpointContainer>,
/// #     identity: Arc<dyn IdentityProvider>,
/// #     signaling: Arc<dyn SignalStrategyFactory>,
/// #     endpoints: Arc<dyn EndpointFactory>,
/// # ) -> SessionResult<SessionFactory> {
/// SessionFactoryBuilder::new()
///     .container(container)
///     .identity_provider(identity)
///     .signal_strategy_factory(signaling)
///     .endpoint_factory(endpoints)
///     .signaling_server("xmpp.example.com:5222")
///     .build()
/// # }
/// ```
#[derive(Default)]
pub struct SessionFactoryBuilder {
    container: Option<Arc<dyn EndpointContainer>>,
    identity: Option<Arc<dyn IdentityProvider>>,
    signaling: Option<Arc<dyn SignalStrategyFactory>>,
    endpoints: Option<Arc<dyn EndpointFactory>>,
    config: FactoryConfig,
}

impl SessionFactoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn container(mut self, container: Arc<dyn EndpointContainer>) -> Self {
        self.container = Some(container);
        self
    }

    pub fn identity_provider(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn signal_strategy_factory(mut self, signaling: Arc<dyn SignalStrategyFactory>) -> Self {
        self.signaling = Some(signaling);
        self
    }

    pub fn endpoint_factory(mut self, endpoints: Arc<dyn EndpointFactory>) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: FactoryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn signaling_server(mut self, server: impl Into<String>) -> Self {
        self.config.signaling_server = server.into();
        self
    }

    /// Application-specific capabilities, appended to the base set
    pub fn app_capabilities(mut self, capabilities: Vec<Capability>) -> Self {
        self.config.app_capabilities = capabilities;
        self
    }

    pub fn build(self) -> SessionResult<SessionFactory> {
        self.config.validate()?;

        let container = self.container.ok_or_else(|| missing("container"))?;
        let identity = self.identity.ok_or_else(|| missing("identity_provider"))?;
        let signaling = self.signaling.ok_or_else(|| missing("signal_strategy_factory"))?;
        let endpoints = self.endpoints.ok_or_else(|| missing("endpoint_factory"))?;

        Ok(SessionFactory::from_parts(
            container,
            self.config,
            identity,
            signaling,
            endpoints,
        ))
    }
}

fn missing(field: &str) -> SessionError {
    SessionError::configuration(field, "required by the session factory")
}

//! Session factory and the establishment pipeline
//!
//! [`SessionFactory::create_session`] runs a strictly ordered pipeline:
//!
//! ```text
//! Identity ──► Signaling ──► EndpointCreation ──► EndpointInitialization ──► SessionConstruction
//!    │            │                                        │
//!    └────────────┴──────────── abort ─────────────────────┘
//!                                 │
//!                 dispose strategy, then endpoint
//!                                 │
//!                                 ▼
//!                          Err(SessionError)
//! ```
//!
//! Stage N+1 never starts before stage N has resolved. The first failure stops
//! the run; everything acquired so far is released before the error is
//! returned. Each call keeps its token, strategy and endpoint in its own local
//! state, so concurrent calls on one factory do not interact.
//!
//! # Example
//!
//! ```rust,no_run
//! # use remoting_core::*;
//! # use remoting_core::events::NoopEventHandler;
//! # use std::sync::Arc;
//! # async fn example(
//! #     container: Arc<dyn EndpointContainer>,
//! #     identity: Arc<dyn IdentityProvider>,
//! #     signaling: Arc<dyn SignalStrategyFactory>,
//! #     endpoints: Arc<dyn EndpointFactory>,
//! # ) -> SessionResult<()> {
//! let factory = SessionFactoryBuilder::new()
//!     .container(container)
//!     .identity_provider(identity)
//!     .signal_strategy_factory(signaling)
//!     .endpoint_factory(endpoints)
//!     .app_capabilities(vec![Capability::Cast])
//!     .build()?;
//!
//! let session = factory.create_session(Arc::new(NoopEventHandler), false).await?;
//! println!("connected: {}", session.id());
//! session.close().await;
//! # Ok(())
//! # }
//! ```

mod builder;
mod pipeline;

pub use builder::SessionFactoryBuilder;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::capability::Capability;
use crate::config::FactoryConfig;
use crate::endpoint::{EndpointContainer, EndpointFactory};
use crate::error::{SessionError, SessionResult};
use crate::events::SessionEventHandler;
use crate::identity::IdentityProvider;
use crate::session::{ClientSession, LoggingPath};
use crate::signaling::SignalStrategyFactory;

use pipeline::PendingResources;

/// One ordered unit of the establishment pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Identity,
    Signaling,
    EndpointCreation,
    EndpointInitialization,
    SessionConstruction,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Identity => "identity",
            Stage::Signaling => "signaling",
            Stage::EndpointCreation => "endpoint_creation",
            Stage::EndpointInitialization => "endpoint_initialization",
            Stage::SessionConstruction => "session_construction",
        };
        f.write_str(name)
    }
}

/// Creates remote sessions for one container and capability set
#[derive(Clone)]
pub struct SessionFactory {
    container: Arc<dyn EndpointContainer>,
    config: Arc<FactoryConfig>,
    required_capabilities: Arc<[Capability]>,
    identity: Arc<dyn IdentityProvider>,
    signaling: Arc<dyn SignalStrategyFactory>,
    endpoints: Arc<dyn EndpointFactory>,
}

impl fmt::Debug for SessionFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionFactory")
            .field("container", &self.container)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionFactory {
    /// Create a factory with default settings. `capabilities` are appended to
    /// the base required set.
    pub fn new(
        container: Arc<dyn EndpointContainer>,
        capabilities: Vec<Capability>,
        identity: Arc<dyn IdentityProvider>,
        signaling: Arc<dyn SignalStrategyFactory>,
        endpoints: Arc<dyn EndpointFactory>,
    ) -> Self {
        let config = FactoryConfig::new().with_app_capabilities(capabilities);
        Self::from_parts(container, config, identity, signaling, endpoints)
    }

    pub(crate) fn from_parts(
        container: Arc<dyn EndpointContainer>,
        config: FactoryConfig,
        identity: Arc<dyn IdentityProvider>,
        signaling: Arc<dyn SignalStrategyFactory>,
        endpoints: Arc<dyn EndpointFactory>,
    ) -> Self {
        let required_capabilities = config.required_capabilities().into();
        Self {
            container,
            config: Arc::new(config),
            required_capabilities,
            identity,
            signaling,
            endpoints,
        }
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Capabilities every endpoint is created with
    pub fn required_capabilities(&self) -> &[Capability] {
        &self.required_capabilities
    }

    /// Run the establishment pipeline.
    ///
    /// Resolves with a session whose strategy is `Connected` and whose
    /// endpoint is `Initialized`, or with the error of the first failed stage
    /// after every acquired resource has been disposed.
    pub async fn create_session(
        &self,
        listener: Arc<dyn SessionEventHandler>,
        use_alternate_logging_path: bool,
    ) -> SessionResult<ClientSession> {
        self.create_session_with_cancel(listener, use_alternate_logging_path, CancellationToken::new())
            .await
    }

    /// Like [`create_session`](Self::create_session), aborting with
    /// `SessionError::Cancelled` when `cancel` fires. Cancellation releases
    /// resources through the same path as a stage failure.
    pub async fn create_session_with_cancel(
        &self,
        listener: Arc<dyn SessionEventHandler>,
        use_alternate_logging_path: bool,
        cancel: CancellationToken,
    ) -> SessionResult<ClientSession> {
        let attempt = Uuid::new_v4();
        let span = info_span!("create_session", %attempt, container = self.container.id());
        let logging_path = LoggingPath::from_flag(use_alternate_logging_path);

        async move {
            let mut pending = PendingResources::default();

            let outcome = {
                let stages = self.run_stages(&mut pending);
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(SessionError::Cancelled),
                    result = stages => result,
                }
            };

            if let Err(error) = outcome {
                warn!(%error, tag = %error.tag(), "session establishment failed");
                pending.release();
                return Err(error);
            }

            debug!(stage = %Stage::SessionConstruction, "handing resources to session");
            let Some((strategy, endpoint)) = pending.take_established() else {
                return Err(SessionError::internal("pipeline completed without its resources"));
            };

            let session = ClientSession::new(endpoint, strategy, logging_path, listener);
            info!(session_id = %session.id(), ?logging_path, "remote session established");
            Ok(session)
        }
        .instrument(span)
        .await
    }

    async fn run_stages(&self, pending: &mut PendingResources) -> SessionResult<()> {
        debug!(stage = %Stage::Identity, "requesting credentials");
        let credentials = pipeline::authenticate(self.identity.as_ref()).await?;

        debug!(stage = %Stage::Signaling, user = %credentials.user.email, "connecting signaling");
        let strategy = pending.strategy.insert(self.signaling.create_strategy());
        pipeline::connect_signaling(&**strategy, &self.config.signaling_server, &credentials).await?;

        debug!(
            stage = %Stage::EndpointCreation,
            capabilities = self.required_capabilities.len(),
            "creating client endpoint"
        );
        let endpoint = pending.endpoint.insert(pipeline::create_endpoint(
            self.endpoints.as_ref(),
            self.container.as_ref(),
            &self.required_capabilities,
        ));

        debug!(stage = %Stage::EndpointInitialization, "initializing client endpoint");
        pipeline::initialize_endpoint(endpoint).await
    }
}

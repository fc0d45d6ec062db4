//! Session factory configuration
//!
//! [`FactoryConfig`] carries everything the pipeline needs that is not a
//! collaborator: the signaling server identifier and the capability lists.
//! It is frozen when the factory is built and shared read-only by every
//! `create_session` call.
//!
//! # Examples
//!
//! ```rust
//! use remoting_core::{Capability, FactoryConfig};
//!
//! let config = FactoryConfig::new()
//!     .with_signaling_server("xmpp.example.com:5222")
//!     .with_app_capabilities(vec![Capability::Cast]);
//!
//! let required = config.required_capabilities();
//! assert_eq!(required.len(), 5);
//! assert_eq!(required.last(), Some(&Capability::Cast));
//! ```
//!
//! ## Loading from YAML
//!
//! ```rust
//! use remoting_core::FactoryConfig;
//!
//! let config = FactoryConfig::from_yaml_str(r#"
//! signaling_server: "xmpp.example.com:5222"
//! app_capabilities: ["googleDrive", "fileTransfer"]
//! "#).unwrap();
//!
//! assert_eq!(config.signaling_server, "xmpp.example.com:5222");
//! assert_eq!(config.required_capabilities().len(), 6);
//! ```

use serde::{Deserialize, Serialize};

use crate::capability::Capability;
use crate::error::{SessionError, SessionResult};

/// Signaling server used when none is configured
pub const DEFAULT_SIGNALING_SERVER: &str = "talk.google.com:443";

/// Immutable settings shared by every session created from one factory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Opaque server identifier handed to `SignalStrategy::connect`
    pub signaling_server: String,
    /// Capabilities every session requires
    pub base_capabilities: Vec<Capability>,
    /// Application-specific capabilities appended after the base set
    pub app_capabilities: Vec<Capability>,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            signaling_server: DEFAULT_SIGNALING_SERVER.to_string(),
            base_capabilities: Capability::base_required(),
            app_capabilities: Vec::new(),
        }
    }
}

impl FactoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from YAML; missing fields take their defaults
    pub fn from_yaml_str(yaml: &str) -> SessionResult<Self> {
        let config: FactoryConfig = serde_yaml::from_str(yaml)
            .map_err(|e| SessionError::configuration("yaml", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_signaling_server(mut self, server: impl Into<String>) -> Self {
        self.signaling_server = server.into();
        self
    }

    pub fn with_base_capabilities(mut self, capabilities: Vec<Capability>) -> Self {
        self.base_capabilities = capabilities;
        self
    }

    pub fn with_app_capabilities(mut self, capabilities: Vec<Capability>) -> Self {
        self.app_capabilities = capabilities;
        self
    }

    /// Base capabilities followed by the application's, duplicates kept
    pub fn required_capabilities(&self) -> Vec<Capability> {
        self.base_capabilities
            .iter()
            .chain(self.app_capabilities.iter())
            .cloned()
            .collect()
    }

    pub fn validate(&self) -> SessionResult<()> {
        if self.signaling_server.trim().is_empty() {
            return Err(SessionError::configuration(
                "signaling_server",
                "signaling server must not be empty",
            ));
        }
        Ok(())
    }
}

//! Capabilities negotiated by the client endpoint
//!
//! A capability is a feature identifier the endpoint advertises when it is
//! created. Every session requires the [`Capability::base_required`] set;
//! applications append their own on top of it.
//!
//! ```rust
//! use remoting_core::Capability;
//!
//! let cap: Capability = "videoRecorder".parse().unwrap();
//! assert_eq!(cap, Capability::VideoRecorder);
//!
//! let custom: Capability = "fileTransfer".parse().unwrap();
//! assert_eq!(custom.as_str(), "fileTransfer");
//! ```

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A feature identifier the endpoint negotiates support for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Capability {
    /// Send the client resolution to the host when the connection starts
    SendInitialResolution,
    /// Throttle resize requests sent to the host
    RateLimitResizeRequests,
    VideoRecorder,
    TouchEvents,
    GoogleDrive,
    Cast,
    SecurityKey,
    /// Any capability this crate does not know by name
    Custom(String),
}

impl Capability {
    /// Capabilities every session requires, in negotiation order
    pub fn base_required() -> Vec<Capability> {
        vec![
            Capability::SendInitialResolution,
            Capability::RateLimitResizeRequests,
            Capability::VideoRecorder,
            Capability::TouchEvents,
        ]
    }

    /// Wire name of the capability
    pub fn as_str(&self) -> &str {
        match self {
            Capability::SendInitialResolution => "sendInitialResolution",
            Capability::RateLimitResizeRequests => "rateLimitResizeRequests",
            Capability::VideoRecorder => "videoRecorder",
            Capability::TouchEvents => "touchEvents",
            Capability::GoogleDrive => "googleDrive",
            Capability::Cast => "casting",
            Capability::SecurityKey => "securityKey",
            Capability::Custom(name) => name,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Capability {
    fn from(name: String) -> Self {
        match name.as_str() {
            "sendInitialResolution" => Capability::SendInitialResolution,
            "rateLimitResizeRequests" => Capability::RateLimitResizeRequests,
            "videoRecorder" => Capability::VideoRecorder,
            "touchEvents" => Capability::TouchEvents,
            "googleDrive" => Capability::GoogleDrive,
            "casting" => Capability::Cast,
            "securityKey" => Capability::SecurityKey,
            _ => Capability::Custom(name),
        }
    }
}

impl From<Capability> for String {
    fn from(capability: Capability) -> Self {
        match capability {
            Capability::Custom(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Capability {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Capability::from(s.to_string()))
    }
}

//! Identity service seam
//!
//! The pipeline never talks to an OAuth server directly. It asks an
//! [`IdentityProvider`] for a token and the signed-in user's info, and maps
//! any failure onto `SessionError::AuthFailed`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by an identity provider
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("no signed-in user")]
    NotSignedIn,

    #[error("token request failed: {0}")]
    TokenUnavailable(String),

    #[error("user info request failed: {0}")]
    UserInfoUnavailable(String),
}

/// Profile of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub email: String,
    pub name: String,
}

/// Token and identity gathered by the identity stage
#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: String,
    pub user: UserInfo,
}

/// Supplies auth tokens and user identity
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fetch an access token for the signed-in user
    async fn get_token(&self) -> Result<String, IdentityError>;

    /// Fetch the signed-in user's profile
    async fn get_user_info(&self) -> Result<UserInfo, IdentityError>;
}

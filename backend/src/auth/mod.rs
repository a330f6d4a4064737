//! Authentication: bearer tokens issued at login and checked on every
//! protected request.
//!
//! - [`AuthenticationProvider`]: login and token verification seam
//! - [`BasicAuthProvider`]: HS256 JWTs over locally managed users
//! - [`middleware`]: axum middleware attaching the [`CurrentUser`]

pub mod basic;
pub mod middleware;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::User;
use crate::service::ServiceError;

pub use basic::BasicAuthProvider;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Unable to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Authenticated caller, stored in the request extensions.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn username(&self) -> &str {
        &self.0.username
    }

    pub fn is_admin(&self) -> bool {
        self.0.is_admin()
    }
}

/// Body of `POST /user/login`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Issues tokens for valid credentials and resolves tokens back to users.
#[async_trait]
pub trait AuthenticationProvider: Send + Sync {
    /// Check the credentials and return a bearer token.
    async fn login(&self, username: &str, password: &str) -> Result<String, AuthError>;

    /// Resolve a bearer token to the user it was issued to.
    async fn authenticate(&self, token: &str) -> Result<User, AuthError>;
}

//! HS256 JSON web tokens over locally managed users.
//!
//! The token subject is the username. Expiry is checked against the
//! injected clock rather than the system time.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{AuthError, AuthenticationProvider};
use crate::config::AuthenticationConfig;
use crate::model::admin::ADMIN_GROUP;
use crate::model::User;
use crate::service::{ApiService, Clock, ErrorKind};

/// Provider name recorded on users it authenticates.
pub const BASIC_PROVIDER: &str = "basic";

/// Claims carried by issued tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct BasicAuthProvider {
    config: AuthenticationConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    users: Arc<dyn ApiService>,
    clock: Clock,
}

impl BasicAuthProvider {
    /// Create a provider. Without a configured secret a random one is used,
    /// so tokens do not survive a restart.
    pub fn new(config: AuthenticationConfig, users: Arc<dyn ApiService>, clock: Clock) -> Self {
        let secret = if config.secret_key.is_empty() {
            warn!("No authentication secret configured, using a random one");
            uuid::Uuid::new_v4().simple().to_string()
        } else {
            config.secret_key.clone()
        };

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared with the injected clock in `verify_token`.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            config,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            users,
            clock,
        }
    }

    /// Token for `username`, valid for the configured number of hours.
    pub fn issue_token(&self, username: &str) -> Result<String, AuthError> {
        let now = (self.clock)();
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.token_validity_hours)).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// The account defined in the configuration file.
    fn configured_user(&self) -> User {
        User {
            username: self.config.username.clone(),
            groups: vec![ADMIN_GROUP.to_string()],
            provider: BASIC_PROVIDER.to_string(),
            ..Default::default()
        }
    }

    /// Check signature and expiry. Returns the token's subject.
    fn verify_token(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|err| {
            debug!(error = %err, "Token rejected");
            AuthError::InvalidToken
        })?;
        if data.claims.exp <= (self.clock)().timestamp() {
            return Err(AuthError::TokenExpired);
        }
        Ok(data.claims.sub)
    }
}

#[async_trait]
impl AuthenticationProvider for BasicAuthProvider {
    async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        if username == self.config.username && password == self.config.password {
            debug!(username, "Configured user logged in");
            return self.issue_token(username);
        }

        match self.users.verify_credentials(username, password).await {
            Ok(user) => {
                debug!(username = %user.username, "User logged in");
                self.issue_token(&user.username)
            }
            Err(err) if err.is(ErrorKind::InvalidPassword) || err.is(ErrorKind::UserNotFound) => {
                Err(AuthError::InvalidCredentials)
            }
            Err(err) => Err(AuthError::Service(err)),
        }
    }

    async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let username = self.verify_token(token)?;
        if username == self.config.username {
            return Ok(self.configured_user());
        }

        match self.users.get_user(&username).await {
            Ok(user) => Ok(user),
            Err(err) if err.is(ErrorKind::UserNotFound) => Err(AuthError::InvalidToken),
            Err(err) => Err(AuthError::Service(err)),
        }
    }
}

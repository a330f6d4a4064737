//! Application state for the HTTP server.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::auth::AuthenticationProvider;
use crate::config::Configuration;
use crate::service::ApiService;
pub use crate::service::{system_clock, Clock};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Immutable service configuration
    pub config: Arc<Configuration>,
    /// Service every handler delegates to
    pub service: Arc<dyn ApiService>,
    /// Issues and verifies bearer tokens
    pub authenticator: Arc<dyn AuthenticationProvider>,
    /// Time source for time windows
    pub clock: Clock,
}

impl AppState {
    /// Create a new application state using the system clock.
    pub fn new(
        config: Configuration,
        service: Arc<dyn ApiService>,
        authenticator: Arc<dyn AuthenticationProvider>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            service,
            authenticator,
            clock: system_clock(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn read_only(&self) -> bool {
        self.config.api_service.read_only
    }
}

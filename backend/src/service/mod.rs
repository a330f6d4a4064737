//! Service trait definitions consumed by the HTTP layer.
//!
//! Each resource family has its own trait; handlers call exactly one method
//! per request (two for the few endpoints that resolve the caller's
//! locations first).
//!
//! # Module Organization
//!
//! - [`error`]: [`ServiceError`] and its [`ErrorKind`] classification
//! - [`hosts`], [`databases`], [`agreements`], [`contracts`],
//!   [`license_types`], [`admin`], [`exadata`], [`alerts`], [`stats`],
//!   [`scenarios`]: one trait per family
//! - [`local`]: in-memory implementation of every trait
//!
//! # Convenience Trait Bound
//!
//! [`ApiService`] composes all families and is what the router state holds:
//!
//! ```ignore
//! let service: Arc<dyn ApiService> = Arc::new(LocalService::new().with_clock(clock));
//! ```

pub mod admin;
pub mod agreements;
pub mod alerts;
pub mod contracts;
pub mod databases;
pub mod error;
pub mod exadata;
pub mod hosts;
pub mod license_types;
pub mod local;
pub mod scenarios;
pub mod stats;

use std::sync::Arc;

use chrono::{DateTime, Utc};

pub use error::{ErrorKind, ServiceError, ServiceResult};

pub use admin::{GroupService, NodeService, RoleService, UserService};
pub use agreements::AgreementService;
pub use alerts::AlertService;
pub use contracts::ContractService;
pub use databases::DatabaseService;
pub use exadata::ExadataService;
pub use hosts::HostService;
pub use license_types::LicenseTypeService;
pub use local::{LocalService, RecordedCall};
pub use scenarios::ScenarioService;
pub use stats::StatsService;

/// Source of the current time, injected wherever "now" matters.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Clock backed by the system time.
pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Composite trait bound for a complete service implementation.
///
/// Automatically implemented for any type implementing every family trait.
pub trait ApiService:
    HostService
    + DatabaseService
    + AgreementService
    + ContractService
    + LicenseTypeService
    + GroupService
    + RoleService
    + UserService
    + NodeService
    + ExadataService
    + AlertService
    + StatsService
    + ScenarioService
{
}

impl<T> ApiService for T where
    T: HostService
        + DatabaseService
        + AgreementService
        + ContractService
        + LicenseTypeService
        + GroupService
        + RoleService
        + UserService
        + NodeService
        + ExadataService
        + AlertService
        + StatsService
        + ScenarioService
{
}

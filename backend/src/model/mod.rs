//! Entities exchanged between the HTTP layer and the service layer.
//!
//! Request bodies derive `Deserialize` with `deny_unknown_fields`, so a
//! field missing from the target type is a decoding failure. Missing fields
//! fall back to their defaults; a missing `id` decodes to [`ObjectId::NIL`].

pub mod admin;
pub mod agreement;
pub mod alert;
pub mod cluster;
pub mod contract;
pub mod exadata;
pub mod filter;
pub mod host;
pub mod license_type;
pub mod object_id;
pub mod scenario;

pub use admin::{Group, Node, PasswordChange, Role, User, UserGroupsUpdate};
pub use agreement::{
    MySqlAgreement, OracleDatabaseAgreement, OracleDatabaseAgreementFe, OracleDatabaseAgreementPart,
};
pub use alert::{AckAlertsRequest, Alert};
pub use cluster::{Cluster, ClusterDetail, VirtualMachine};
pub use contract::{
    AssociatedHost, ContractImport, MySqlContract, OracleDatabaseContract, OracleDatabaseContractFe,
    SqlServerDatabaseContract,
};
pub use exadata::{
    ComponentClusterNamesUpdate, ExadataComponent, ExadataInstance, ExadataPatchAdvisor,
    ExadataRdma, ExadataVm, VmClusterNameUpdate,
};
pub use filter::{
    AdvisorFilter, AlertsFilter, CountRange, GlobalFilter, OracleDatabaseAgreementsFilter,
    OracleDatabaseContractsFilter, SearchFilter,
};
pub use host::{
    Addm, DatabaseLicense, Host, HostsMode, MissingDatabase, OracleDatabase,
    OracleDatabaseMissingDbs, PatchingFunction, PatchingFunctionRequest, SegmentAdvisor,
};
pub use license_type::{LicenseCompliance, OracleDatabaseLicenseType, SqlServerDatabaseLicenseType};
pub use object_id::{ObjectId, ObjectIdError};
pub use scenario::{
    Comparison, CreateScenarioRequest, LicenseUsedCluster, LicenseUsedDatabase, LicenseUsedHost, Scenario,
    ScenarioLicenses, ScenarioSummary, SimulatedHost, SimulatedHostRequest, Simulation,
};

/// A cross-field rule rejected an otherwise well-formed entity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Supported database families of the contract import/sample endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    Oracle,
    SqlServer,
    MySql,
}

impl DatabaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Oracle => "oracle",
            Self::SqlServer => "sqlserver",
            Self::MySql => "mysql",
        }
    }
}

impl std::str::FromStr for DatabaseType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "oracle" => Ok(Self::Oracle),
            "sqlserver" => Ok(Self::SqlServer),
            "mysql" => Ok(Self::MySql),
            other => Err(ValidationError::new(format!(
                "Invalid database type: {}",
                other
            ))),
        }
    }
}

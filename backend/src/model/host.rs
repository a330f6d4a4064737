//! Hosts and the Oracle databases they run.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Cluster, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Host {
    pub hostname: String,
    pub location: String,
    pub environment: String,
    #[serde(rename = "type")]
    pub host_type: String,
    pub operating_system: String,
    pub cpu_cores: u32,
    pub memory_gb: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub oracle_databases: Vec<OracleDatabase>,
    /// Databases the host declares but whose agent reported no data.
    pub missing_databases: Vec<MissingDatabase>,
    /// Hypervisor clusters, set on hosts running a virtualization manager.
    pub clusters: Vec<Cluster>,
}

impl Host {
    pub fn database(&self, name: &str) -> Option<&OracleDatabase> {
        self.oracle_databases.iter().find(|db| db.name == name)
    }

    pub fn database_mut(&mut self, name: &str) -> Option<&mut OracleDatabase> {
        self.oracle_databases.iter_mut().find(|db| db.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OracleDatabase {
    pub name: String,
    pub version: String,
    pub status: String,
    pub work: f64,
    pub memory: f64,
    pub datafile_size: f64,
    pub segments_size: f64,
    pub archivelog: bool,
    pub dataguard: bool,
    #[serde(rename = "isRAC")]
    pub is_rac: bool,
    pub tags: Vec<String>,
    pub licenses: Vec<DatabaseLicense>,
    pub addms: Vec<Addm>,
    pub segment_advisors: Vec<SegmentAdvisor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psu_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatabaseLicense {
    #[serde(rename = "licenseTypeID")]
    pub license_type_id: String,
    pub count: f64,
    pub ignored: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Addm {
    pub finding: String,
    pub recommendation: String,
    pub action: String,
    pub benefit: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SegmentAdvisor {
    pub segment_owner: String,
    pub segment_name: String,
    pub segment_type: String,
    pub partition_name: String,
    pub reclaimable: f64,
    pub recommendation: String,
}

/// Database expected on a host but not reported by its agent.
///
/// Also the body of the ignored-field update; only `ignoredComment` is read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct MissingDatabase {
    pub name: String,
    pub ignored: bool,
    pub ignored_comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleDatabaseMissingDbs {
    pub hostname: String,
    pub missing_databases: Vec<MissingDatabase>,
}

/// Stored custom patching function of a host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchingFunction {
    pub hostname: String,
    pub created_at: DateTime<Utc>,
    pub code: String,
    pub vars: serde_json::Map<String, serde_json::Value>,
}

/// Body of `PUT /hosts/{hostname}/patching-function`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PatchingFunctionRequest {
    pub code: String,
    pub vars: serde_json::Map<String, serde_json::Value>,
}

impl PatchingFunctionRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::new("code is required"));
        }
        Ok(())
    }
}

/// Shape of the rows returned by `GET /hosts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostsMode {
    #[default]
    Full,
    Summary,
    Lms,
    /// Stored host documents as they are.
    Mongo,
    Hostnames,
}

impl FromStr for HostsMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "full" => Ok(Self::Full),
            "summary" => Ok(Self::Summary),
            "lms" => Ok(Self::Lms),
            "mongo" => Ok(Self::Mongo),
            "hostnames" => Ok(Self::Hostnames),
            _ => Err(ValidationError::new("Invalid value for mode")),
        }
    }
}

impl fmt::Display for HostsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Full => "full",
            Self::Summary => "summary",
            Self::Lms => "lms",
            Self::Mongo => "mongo",
            Self::Hostnames => "hostnames",
        };
        f.write_str(name)
    }
}

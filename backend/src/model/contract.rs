//! License contracts for Oracle, SQL Server and MySQL databases.

use serde::{Deserialize, Serialize};

use super::{ObjectId, ValidationError};

// =============================================================================
// Oracle/Database
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct OracleDatabaseContract {
    pub id: ObjectId,
    #[serde(rename = "contractID")]
    pub contract_id: String,
    pub csi: String,
    #[serde(rename = "licenseTypeID")]
    pub license_type_id: String,
    pub reference_number: String,
    pub unlimited: bool,
    pub count: i64,
    pub basket: bool,
    pub restricted: bool,
    pub hosts: Vec<String>,
}

impl OracleDatabaseContract {
    /// Unlimited contracts must be basket; restricted ones cannot be.
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.unlimited && !self.basket {
            return Err(ValidationError::new(
                "Contract is unlimited so it must be even Basket",
            ));
        }
        if self.restricted && self.basket {
            return Err(ValidationError::new(
                "Contract can't be both restricted and Basket",
            ));
        }
        Ok(())
    }
}

/// Host linked to an agreement or contract, with license coverage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociatedHost {
    pub hostname: String,
    pub covered_licenses_count: f64,
    pub total_covered_licenses_count: f64,
    pub consumed_licenses_count: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleDatabaseContractFe {
    pub id: ObjectId,
    #[serde(rename = "contractID")]
    pub contract_id: String,
    pub csi: String,
    #[serde(rename = "licenseTypeID")]
    pub license_type_id: String,
    pub item_description: String,
    pub metric: String,
    pub reference_number: String,
    pub unlimited: bool,
    pub basket: bool,
    pub restricted: bool,
    pub hosts: Vec<AssociatedHost>,
    pub licenses_per_core: f64,
    pub licenses_per_user: f64,
    pub available_licenses_per_core: f64,
    pub available_licenses_per_user: f64,
}

// =============================================================================
// Microsoft/SQL Server
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SqlServerDatabaseContract {
    pub id: ObjectId,
    #[serde(rename = "contractID")]
    pub contract_id: String,
    #[serde(rename = "type")]
    pub contract_type: String,
    #[serde(rename = "licenseTypeID")]
    pub license_type_id: String,
    pub licenses_number: i64,
    pub hosts: Vec<String>,
    pub clusters: Vec<String>,
}

// =============================================================================
// MySQL
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct MySqlContract {
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub contract_type: String,
    #[serde(rename = "contractID")]
    pub contract_id: String,
    pub csi: String,
    pub number_of_licenses: u32,
    pub clusters: Vec<String>,
    pub hosts: Vec<String>,
    pub location: String,
}

impl MySqlContract {
    pub const TYPE_HOST: &'static str = "host";
    pub const TYPE_CLUSTER: &'static str = "cluster";

    pub fn is_valid(&self) -> bool {
        self.contract_type == Self::TYPE_HOST || self.contract_type == Self::TYPE_CLUSTER
    }
}

// =============================================================================
// Import
// =============================================================================

/// Contracts decoded from an uploaded CSV file.
#[derive(Debug, Clone, PartialEq)]
pub enum ContractImport {
    Oracle(Vec<OracleDatabaseContract>),
    SqlServer(Vec<SqlServerDatabaseContract>),
    MySql(Vec<MySqlContract>),
}

impl ContractImport {
    pub fn len(&self) -> usize {
        match self {
            Self::Oracle(c) => c.len(),
            Self::SqlServer(c) => c.len(),
            Self::MySql(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Oracle/Database license agreements.

use serde::{Deserialize, Serialize};

use super::{AssociatedHost, ObjectId, ValidationError};

/// Agreement as stored and as accepted by the add/update endpoints.
///
/// `catch_all` is the agreement counterpart of a contract's basket flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct OracleDatabaseAgreement {
    pub id: ObjectId,
    #[serde(rename = "agreementID")]
    pub agreement_id: String,
    pub csi: String,
    #[serde(rename = "licenseTypeID")]
    pub license_type_id: String,
    pub reference_number: String,
    pub unlimited: bool,
    pub count: i64,
    pub catch_all: bool,
    pub restricted: bool,
    pub hosts: Vec<String>,
}

impl OracleDatabaseAgreement {
    /// Check the cross-field flag rules.
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.unlimited && !self.catch_all {
            return Err(ValidationError::new(
                "Agreement is unlimited so it must be even catch-all",
            ));
        }
        if self.restricted && self.catch_all {
            return Err(ValidationError::new(
                "Agreement can't be both restricted and catch-all",
            ));
        }
        Ok(())
    }
}

/// Agreement enriched with license type details and coverage figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleDatabaseAgreementFe {
    pub id: ObjectId,
    #[serde(rename = "agreementID")]
    pub agreement_id: String,
    pub csi: String,
    #[serde(rename = "licenseTypeID")]
    pub license_type_id: String,
    pub item_description: String,
    pub metric: String,
    pub reference_number: String,
    pub unlimited: bool,
    pub catch_all: bool,
    pub restricted: bool,
    pub hosts: Vec<AssociatedHost>,
    pub licenses_per_core: f64,
    pub licenses_per_user: f64,
    pub available_licenses_per_core: f64,
    pub available_licenses_per_user: f64,
}

/// MySQL agreement, covering either single servers or whole clusters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct MySqlAgreement {
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub agreement_type: String,
    pub csi: String,
    pub number_of_licenses: u32,
    pub clusters: Vec<String>,
    pub hosts: Vec<String>,
}

impl MySqlAgreement {
    pub const TYPE_SERVER: &'static str = "server";
    pub const TYPE_CLUSTER: &'static str = "cluster";

    pub fn is_valid(&self) -> bool {
        self.agreement_type == Self::TYPE_SERVER || self.agreement_type == Self::TYPE_CLUSTER
    }
}

/// Catalog entry of a purchasable part referenced by agreements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleDatabaseAgreementPart {
    #[serde(rename = "partID")]
    pub part_id: String,
    pub item_description: String,
    pub metric: String,
    pub aliases: Vec<String>,
}

use serde::{Deserialize, Serialize};

/// Metric whose counts are expressed per named user.
pub const METRIC_NAMED_USER_PLUS: &str = "Named User Plus Perpetual";

/// Oracle license catalog entry. The id is the vendor part number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct OracleDatabaseLicenseType {
    pub id: String,
    pub item_description: String,
    pub metric: String,
    pub cost: f64,
    pub aliases: Vec<String>,
    pub option: bool,
}

impl OracleDatabaseLicenseType {
    pub fn is_named_user(&self) -> bool {
        self.metric == METRIC_NAMED_USER_PLUS
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SqlServerDatabaseLicenseType {
    pub id: String,
    pub item_description: String,
    pub edition: String,
    pub version: String,
}

/// Compliance summary of one license type across the fleet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseCompliance {
    #[serde(rename = "licenseTypeID")]
    pub license_type_id: String,
    pub item_description: String,
    pub metric: String,
    pub consumed: f64,
    pub covered: f64,
    pub compliance: f64,
    pub unlimited: bool,
}

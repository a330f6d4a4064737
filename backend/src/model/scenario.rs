//! What-if license scenarios: license usage recomputed with some hosts
//! running on a different number of cores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LicenseCompliance, ObjectId};

/// Body of `POST /scenarios`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateScenarioRequest {
    pub name: String,
    pub hosts: Vec<SimulatedHostRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatedHostRequest {
    pub hostname: String,
    pub core: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedHost {
    pub id: ObjectId,
    pub hostname: String,
    pub original_core: u32,
    pub simulated_core: u32,
}

impl SimulatedHost {
    /// Factor applied to the host's license counts. Hosts reporting no
    /// cores keep their counts.
    pub fn scale(&self) -> f64 {
        if self.original_core == 0 {
            1.0
        } else {
            f64::from(self.simulated_core) / f64::from(self.original_core)
        }
    }
}

/// The same rows computed before (`actual`) and after (`got`) the simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Simulation<T> {
    pub actual: Vec<T>,
    pub got: Vec<T>,
}

impl<T: Clone> Simulation<T> {
    /// Pair every `got` row with the `actual` row sharing its key.
    pub fn pairs<K: PartialEq>(&self, key: impl Fn(&T) -> K) -> Vec<Comparison<T>> {
        self.got
            .iter()
            .filter_map(|got| {
                self.actual
                    .iter()
                    .find(|actual| key(actual) == key(got))
                    .map(|actual| Comparison {
                        actual: actual.clone(),
                        got: got.clone(),
                    })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison<T> {
    pub actual: T,
    pub got: T,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseUsedDatabase {
    pub hostname: String,
    pub db_name: String,
    #[serde(rename = "licenseTypeID")]
    pub license_type_id: String,
    pub used_licenses: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseUsedHost {
    pub hostname: String,
    #[serde(rename = "licenseTypeID")]
    pub license_type_id: String,
    pub used_licenses: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseUsedCluster {
    pub cluster: String,
    #[serde(rename = "licenseTypeID")]
    pub license_type_id: String,
    pub used_licenses: f64,
}

/// Stored scenario with every simulated view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scenario {
    pub id: ObjectId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub hosts: Vec<SimulatedHost>,
    pub license_compliance: Simulation<LicenseCompliance>,
    pub license_used_database: Simulation<LicenseUsedDatabase>,
    pub license_used_host: Simulation<LicenseUsedHost>,
    pub license_used_cluster: Simulation<LicenseUsedCluster>,
}

impl Scenario {
    pub fn summary(&self) -> ScenarioSummary {
        ScenarioSummary {
            id: self.id,
            name: self.name.clone(),
            created_at: self.created_at,
            hosts: self.hosts.clone(),
        }
    }

    pub fn compliance(&self) -> ScenarioLicenses<LicenseCompliance> {
        self.licenses(self.license_compliance.pairs(|l| l.license_type_id.clone()))
    }

    pub fn used_per_database(&self) -> ScenarioLicenses<LicenseUsedDatabase> {
        self.licenses(self.license_used_database.pairs(|l| {
            (l.hostname.clone(), l.db_name.clone(), l.license_type_id.clone())
        }))
    }

    pub fn used_per_host(&self) -> ScenarioLicenses<LicenseUsedHost> {
        self.licenses(
            self.license_used_host
                .pairs(|l| (l.hostname.clone(), l.license_type_id.clone())),
        )
    }

    pub fn used_per_cluster(&self) -> ScenarioLicenses<LicenseUsedCluster> {
        self.licenses(
            self.license_used_cluster
                .pairs(|l| (l.cluster.clone(), l.license_type_id.clone())),
        )
    }

    fn licenses<T>(&self, licenses: Vec<Comparison<T>>) -> ScenarioLicenses<T> {
        ScenarioLicenses {
            id: self.id,
            name: self.name.clone(),
            created_at: self.created_at,
            licenses,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub id: ObjectId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub hosts: Vec<SimulatedHost>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioLicenses<T> {
    pub id: ObjectId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub licenses: Vec<Comparison<T>>,
}

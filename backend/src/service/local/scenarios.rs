use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;

use super::{not_found, LocalData, LocalService};
use crate::model::{
    CreateScenarioRequest, GlobalFilter, LicenseUsedCluster, LicenseUsedDatabase, LicenseUsedHost, ObjectId,
    Scenario, SimulatedHost, Simulation,
};
use crate::service::error::{ErrorKind, ServiceResult};
use crate::service::ScenarioService;

/// License count factor per hostname.
pub(super) type CoreScaling = HashMap<String, f64>;

pub(super) fn scaled(scaling: &CoreScaling, hostname: &str, count: f64) -> f64 {
    scaling.get(hostname).map_or(count, |factor| count * factor)
}

fn simulate<T>(scaling: &CoreScaling, view: impl Fn(&CoreScaling) -> Vec<T>) -> Simulation<T> {
    Simulation {
        actual: view(&CoreScaling::new()),
        got: view(scaling),
    }
}

impl LocalData {
    fn used_per_database(&self, filter: &GlobalFilter, scaling: &CoreScaling) -> Vec<LicenseUsedDatabase> {
        self.visible_databases(filter)
            .flat_map(|(host, db)| {
                db.licenses
                    .iter()
                    .filter(|l| !l.ignored)
                    .map(move |l| LicenseUsedDatabase {
                        hostname: host.hostname.clone(),
                        db_name: db.name.clone(),
                        license_type_id: l.license_type_id.clone(),
                        used_licenses: scaled(scaling, &host.hostname, l.count),
                    })
            })
            .collect()
    }

    fn used_per_host(&self, filter: &GlobalFilter, scaling: &CoreScaling) -> Vec<LicenseUsedHost> {
        let mut used: BTreeMap<(String, String), f64> = BTreeMap::new();
        for row in self.used_per_database(filter, scaling) {
            *used.entry((row.hostname, row.license_type_id)).or_default() += row.used_licenses;
        }
        used.into_iter()
            .map(|((hostname, license_type_id), used_licenses)| LicenseUsedHost {
                hostname,
                license_type_id,
                used_licenses,
            })
            .collect()
    }

    /// Usage of the hosts belonging to a cluster, summed per cluster.
    fn used_per_cluster(&self, filter: &GlobalFilter, scaling: &CoreScaling) -> Vec<LicenseUsedCluster> {
        let mut used: BTreeMap<(String, String), f64> = BTreeMap::new();
        for (host, db) in self.visible_databases(filter) {
            let Some(cluster) = &host.cluster else {
                continue;
            };
            for license in db.licenses.iter().filter(|l| !l.ignored) {
                *used
                    .entry((cluster.clone(), license.license_type_id.clone()))
                    .or_default() += scaled(scaling, &host.hostname, license.count);
            }
        }
        used.into_iter()
            .map(|((cluster, license_type_id), used_licenses)| LicenseUsedCluster {
                cluster,
                license_type_id,
                used_licenses,
            })
            .collect()
    }

    fn simulated_host(&self, hostname: &str, core: u32) -> ServiceResult<SimulatedHost> {
        let host = self
            .hosts
            .get(hostname)
            .filter(|h| !h.archived)
            .ok_or_else(|| not_found(ErrorKind::HostNotFound, hostname))?;
        Ok(SimulatedHost {
            id: ObjectId::generate(),
            hostname: host.hostname.clone(),
            original_core: host.cpu_cores,
            simulated_core: core,
        })
    }
}

#[async_trait]
impl ScenarioService for LocalService {
    async fn create_scenario(&self, request: CreateScenarioRequest, filter: &GlobalFilter) -> ServiceResult<Scenario> {
        self.record("create_scenario", format!("{:?}, {:?}", request, filter))?;
        let scenario = {
            let data = self.data.read();
            let hosts = request
                .hosts
                .iter()
                .map(|h| data.simulated_host(&h.hostname, h.core))
                .collect::<ServiceResult<Vec<_>>>()?;
            let scaling: CoreScaling = hosts.iter().map(|h| (h.hostname.clone(), h.scale())).collect();

            Scenario {
                id: ObjectId::generate(),
                name: request.name,
                created_at: self.now(),
                license_compliance: simulate(&scaling, |s| data.licenses_compliance_scaled(filter, s)),
                license_used_database: simulate(&scaling, |s| data.used_per_database(filter, s)),
                license_used_host: simulate(&scaling, |s| data.used_per_host(filter, s)),
                license_used_cluster: simulate(&scaling, |s| data.used_per_cluster(filter, s)),
                hosts,
            }
        };
        self.data.write().scenarios.push(scenario.clone());
        Ok(scenario)
    }

    async fn get_scenarios(&self) -> ServiceResult<Vec<Scenario>> {
        self.record("get_scenarios", String::new())?;
        Ok(self.data.read().scenarios.clone())
    }

    async fn get_scenario(&self, id: ObjectId) -> ServiceResult<Scenario> {
        self.record("get_scenario", format!("{:?}", id))?;
        self.data
            .read()
            .scenarios
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| not_found(ErrorKind::NotFound, id))
    }

    async fn remove_scenario(&self, id: ObjectId) -> ServiceResult<()> {
        self.record("remove_scenario", format!("{:?}", id))?;
        let mut data = self.data.write();
        let before = data.scenarios.len();
        data.scenarios.retain(|s| s.id != id);
        if data.scenarios.len() == before {
            return Err(not_found(ErrorKind::NotFound, id));
        }
        Ok(())
    }
}

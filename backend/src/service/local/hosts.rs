use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use super::{not_found, records_workbook, search_rows, LocalData, LocalService};
use crate::model::{
    Cluster, ClusterDetail, GlobalFilter, Host, HostsMode, PatchingFunction, PatchingFunctionRequest,
    SearchFilter, User,
};
use crate::service::error::{ErrorKind, ServiceError, ServiceResult};
use crate::service::HostService;

/// Role location granting visibility on every location.
const ANY_LOCATION: &str = "Any";

const HOST_HEADERS: [&str; 9] = [
    "Hostname",
    "Location",
    "Environment",
    "Type",
    "Operating System",
    "Cores",
    "Memory (GB)",
    "Cluster",
    "Databases",
];
const HOST_KEYS: [&str; 9] = [
    "hostname",
    "location",
    "environment",
    "type",
    "operatingSystem",
    "cpuCores",
    "memoryGb",
    "cluster",
    "databases",
];

const CLUSTER_HEADERS: [&str; 5] = ["Name", "Type", "CPU", "Sockets", "Physical Hosts"];
const CLUSTER_KEYS: [&str; 5] = ["name", "type", "cpu", "sockets", "physicalHosts"];

impl LocalData {
    /// Hosts that are not archived and pass the global filter.
    pub(super) fn visible_hosts<'a>(&'a self, filter: &'a GlobalFilter) -> impl Iterator<Item = &'a Host> + 'a {
        self.hosts
            .values()
            .filter(move |h| !h.archived && filter.matches(&h.location, &h.environment, h.created_at))
    }

    pub(super) fn live_host_mut(&mut self, hostname: &str) -> ServiceResult<&mut Host> {
        self.hosts
            .get_mut(hostname)
            .filter(|h| !h.archived)
            .ok_or_else(|| not_found(ErrorKind::HostNotFound, hostname))
    }
}

fn cluster_detail(host: &Host, cluster: &Cluster) -> ClusterDetail {
    ClusterDetail {
        name: cluster.name.clone(),
        cluster_type: cluster.cluster_type.clone(),
        cpu: cluster.cpu,
        sockets: cluster.sockets,
        hostname: host.hostname.clone(),
        location: host.location.clone(),
        environment: host.environment.clone(),
        created_at: host.created_at,
        physical_hosts: cluster.physical_hosts(),
        vms_count: cluster.vms.len(),
        vms: cluster.vms.clone(),
    }
}

fn cluster_rows(data: &LocalData, full: bool, filter: &GlobalFilter) -> ServiceResult<Vec<Value>> {
    let mut rows = Vec::new();
    for host in data.visible_hosts(filter) {
        for cluster in &host.clusters {
            let mut row = serde_json::to_value(cluster_detail(host, cluster))
                .map_err(|e| ServiceError::internal(e.to_string()))?;
            if !full {
                if let Some(object) = row.as_object_mut() {
                    object.remove("vms");
                }
            }
            rows.push(row);
        }
    }
    Ok(rows)
}

pub(super) fn host_summary(host: &Host) -> Value {
    json!({
        "hostname": host.hostname,
        "location": host.location,
        "environment": host.environment,
        "type": host.host_type,
        "operatingSystem": host.operating_system,
        "cpuCores": host.cpu_cores,
        "memoryGb": host.memory_gb,
        "cluster": host.cluster,
        "createdAt": host.created_at,
        "databases": host.oracle_databases.iter().map(|db| db.name.as_str()).collect::<Vec<_>>(),
    })
}

fn host_rows(host: &Host, mode: HostsMode) -> ServiceResult<Vec<Value>> {
    let rows = match mode {
        HostsMode::Full => {
            let mut row = host_summary(host);
            row["oracleDatabases"] = serde_json::to_value(&host.oracle_databases)
                .map_err(|e| ServiceError::internal(e.to_string()))?;
            vec![row]
        }
        HostsMode::Summary => vec![host_summary(host)],
        HostsMode::Lms => host
            .oracle_databases
            .iter()
            .map(|db| {
                json!({
                    "hostname": host.hostname,
                    "location": host.location,
                    "environment": host.environment,
                    "dbName": db.name,
                    "version": db.version,
                    "cpuCores": host.cpu_cores,
                    "licenseTypeIDs": db.licenses.iter()
                        .filter(|l| !l.ignored)
                        .map(|l| l.license_type_id.as_str())
                        .collect::<Vec<_>>(),
                })
            })
            .collect(),
        HostsMode::Mongo => {
            vec![serde_json::to_value(host).map_err(|e| ServiceError::internal(e.to_string()))?]
        }
        HostsMode::Hostnames => vec![json!({ "hostname": host.hostname })],
    };
    Ok(rows)
}

#[async_trait]
impl HostService for LocalService {
    async fn search_hosts(&self, mode: HostsMode, filter: &SearchFilter) -> ServiceResult<Vec<Value>> {
        self.record("search_hosts", format!("{:?}, {:?}", mode, filter))?;
        let data = self.data.read();
        let mut rows = Vec::new();
        for host in data.visible_hosts(&filter.global) {
            rows.extend(host_rows(host, mode)?);
        }
        Ok(search_rows(rows, filter))
    }

    async fn search_hosts_as_xlsx(&self, filter: &SearchFilter) -> ServiceResult<Vec<u8>> {
        self.record("search_hosts_as_xlsx", format!("{:?}", filter))?;
        let rows: Vec<Value> = {
            let data = self.data.read();
            data.visible_hosts(&filter.global).map(host_summary).collect()
        };
        let rows = search_rows(rows, &filter.unpaged());
        records_workbook("Hosts", &HOST_HEADERS, &HOST_KEYS, &rows)
    }

    async fn get_host(&self, hostname: &str) -> ServiceResult<Host> {
        self.record("get_host", format!("{:?}", hostname))?;
        self.data
            .read()
            .hosts
            .get(hostname)
            .filter(|h| !h.archived)
            .cloned()
            .ok_or_else(|| not_found(ErrorKind::HostNotFound, hostname))
    }

    async fn archive_host(&self, hostname: &str) -> ServiceResult<()> {
        self.record("archive_host", format!("{:?}", hostname))?;
        let mut data = self.data.write();
        data.live_host_mut(hostname)?.archived = true;
        Ok(())
    }

    async fn get_patching_function(&self, hostname: &str) -> ServiceResult<PatchingFunction> {
        self.record("get_patching_function", format!("{:?}", hostname))?;
        self.data
            .read()
            .patching_functions
            .get(hostname)
            .cloned()
            .ok_or_else(|| not_found(ErrorKind::PatchingFunctionNotFound, hostname))
    }

    async fn set_patching_function(
        &self,
        hostname: &str,
        request: PatchingFunctionRequest,
    ) -> ServiceResult<PatchingFunction> {
        self.record("set_patching_function", format!("{:?}, {:?}", hostname, request))?;
        let now = self.now();
        let mut data = self.data.write();
        data.live_host_mut(hostname)?;
        let function = PatchingFunction {
            hostname: hostname.to_string(),
            created_at: now,
            code: request.code,
            vars: request.vars,
        };
        data.patching_functions
            .insert(hostname.to_string(), function.clone());
        Ok(function)
    }

    async fn delete_patching_function(&self, hostname: &str) -> ServiceResult<()> {
        self.record("delete_patching_function", format!("{:?}", hostname))?;
        let mut data = self.data.write();
        data.live_host_mut(hostname)?;
        data.patching_functions.remove(hostname);
        Ok(())
    }

    async fn add_tag_to_oracle_database(&self, hostname: &str, dbname: &str, tag: &str) -> ServiceResult<()> {
        self.record(
            "add_tag_to_oracle_database",
            format!("{:?}, {:?}, {:?}", hostname, dbname, tag),
        )?;
        let mut data = self.data.write();
        let db = data
            .live_host_mut(hostname)?
            .database_mut(dbname)
            .ok_or_else(|| not_found(ErrorKind::NotFound, dbname))?;
        if !db.tags.iter().any(|t| t == tag) {
            db.tags.push(tag.to_string());
        }
        Ok(())
    }

    async fn delete_tag_of_oracle_database(&self, hostname: &str, dbname: &str, tag: &str) -> ServiceResult<()> {
        self.record(
            "delete_tag_of_oracle_database",
            format!("{:?}, {:?}, {:?}", hostname, dbname, tag),
        )?;
        let mut data = self.data.write();
        let db = data
            .live_host_mut(hostname)?
            .database_mut(dbname)
            .ok_or_else(|| not_found(ErrorKind::NotFound, dbname))?;
        db.tags.retain(|t| t != tag);
        Ok(())
    }

    async fn set_license_ignored_field(
        &self,
        hostname: &str,
        dbname: &str,
        license_type_id: &str,
        ignored: bool,
    ) -> ServiceResult<()> {
        self.record(
            "set_license_ignored_field",
            format!("{:?}, {:?}, {:?}, {:?}", hostname, dbname, license_type_id, ignored),
        )?;
        let mut data = self.data.write();
        let license = data
            .live_host_mut(hostname)?
            .database_mut(dbname)
            .ok_or_else(|| not_found(ErrorKind::NotFound, dbname))?
            .licenses
            .iter_mut()
            .find(|l| l.license_type_id == license_type_id)
            .ok_or_else(|| not_found(ErrorKind::LicenseTypeIdNotFound, license_type_id))?;
        license.ignored = ignored;
        Ok(())
    }

    async fn search_clusters(&self, full: bool, filter: &SearchFilter) -> ServiceResult<Vec<Value>> {
        self.record("search_clusters", format!("{:?}, {:?}", full, filter))?;
        let rows = cluster_rows(&self.data.read(), full, &filter.global)?;
        Ok(search_rows(rows, filter))
    }

    async fn search_clusters_as_xlsx(&self, filter: &SearchFilter) -> ServiceResult<Vec<u8>> {
        self.record("search_clusters_as_xlsx", format!("{:?}", filter))?;
        let rows = cluster_rows(&self.data.read(), false, &filter.global)?;
        let rows = search_rows(rows, &filter.unpaged());
        records_workbook("Hypervisor", &CLUSTER_HEADERS, &CLUSTER_KEYS, &rows)
    }

    async fn get_cluster(&self, name: &str, older_than: DateTime<Utc>) -> ServiceResult<ClusterDetail> {
        self.record("get_cluster", format!("{:?}, {:?}", name, older_than))?;
        let data = self.data.read();
        let filter = GlobalFilter {
            older_than,
            ..Default::default()
        };
        let found = data.visible_hosts(&filter).find_map(|host| {
            host.clusters
                .iter()
                .find(|c| c.name == name)
                .map(|cluster| cluster_detail(host, cluster))
        });
        found.ok_or_else(|| not_found(ErrorKind::ClusterNotFound, name))
    }

    async fn list_locations(&self, filter: &GlobalFilter) -> ServiceResult<Vec<String>> {
        self.record("list_locations", format!("{:?}", filter))?;
        let data = self.data.read();
        let locations: BTreeSet<String> = data.visible_hosts(filter).map(|h| h.location.clone()).collect();
        Ok(locations.into_iter().collect())
    }

    async fn list_environments(&self, filter: &GlobalFilter) -> ServiceResult<Vec<String>> {
        self.record("list_environments", format!("{:?}", filter))?;
        let data = self.data.read();
        let environments: BTreeSet<String> =
            data.visible_hosts(filter).map(|h| h.environment.clone()).collect();
        Ok(environments.into_iter().collect())
    }

    async fn list_user_locations(&self, user: &User) -> ServiceResult<Vec<String>> {
        self.record("list_user_locations", format!("{:?}", user.username))?;
        let data = self.data.read();
        let all_locations = || -> BTreeSet<String> {
            data.hosts
                .values()
                .map(|h| h.location.clone())
                .chain(data.mysql_contracts.iter().map(|c| c.location.clone()))
                .collect()
        };
        if user.is_admin() {
            return Ok(all_locations().into_iter().collect());
        }

        let role_locations: BTreeSet<String> = data
            .groups
            .iter()
            .filter(|g| user.groups.contains(&g.name))
            .flat_map(|g| g.roles.iter())
            .filter_map(|role| data.roles.iter().find(|r| &r.name == role))
            .map(|r| r.location.clone())
            .collect();
        if role_locations.contains(ANY_LOCATION) {
            return Ok(all_locations().into_iter().collect());
        }
        Ok(role_locations.into_iter().collect())
    }
}

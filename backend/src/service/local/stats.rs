use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use super::LocalService;
use crate::model::GlobalFilter;
use crate::service::error::ServiceResult;
use crate::service::StatsService;

/// `[{"<field>": key, "count": n}]`, ordered by key.
fn count_by<I, K>(field: &str, keys: I) -> Vec<Value>
where
    I: IntoIterator<Item = K>,
    K: Into<String>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for key in keys {
        *counts.entry(key.into()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(key, count)| json!({ field: key, "count": count }))
        .collect()
}

fn status_counts(field: &str, flags: impl Iterator<Item = bool>) -> Vec<Value> {
    let (mut on, mut off) = (0usize, 0usize);
    for flag in flags {
        if flag {
            on += 1;
        } else {
            off += 1;
        }
    }
    vec![
        json!({ field: true, "count": on }),
        json!({ field: false, "count": off }),
    ]
}

#[async_trait]
impl StatsService for LocalService {
    async fn get_environment_stats(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>> {
        self.record("get_environment_stats", format!("{:?}", filter))?;
        let data = self.data.read();
        Ok(count_by("environment", data.visible_hosts(filter).map(|h| h.environment.as_str())))
    }

    async fn get_type_stats(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>> {
        self.record("get_type_stats", format!("{:?}", filter))?;
        let data = self.data.read();
        Ok(count_by("type", data.visible_hosts(filter).map(|h| h.host_type.as_str())))
    }

    async fn get_operating_system_stats(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>> {
        self.record("get_operating_system_stats", format!("{:?}", filter))?;
        let data = self.data.read();
        Ok(count_by(
            "operatingSystem",
            data.visible_hosts(filter).map(|h| h.operating_system.as_str()),
        ))
    }

    async fn get_oracle_database_environment_stats(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>> {
        self.record("get_oracle_database_environment_stats", format!("{:?}", filter))?;
        let data = self.data.read();
        Ok(count_by(
            "environment",
            data.visible_databases(filter).map(|(h, _)| h.environment.as_str()),
        ))
    }

    async fn get_oracle_database_version_stats(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>> {
        self.record("get_oracle_database_version_stats", format!("{:?}", filter))?;
        let data = self.data.read();
        Ok(count_by(
            "version",
            data.visible_databases(filter).map(|(_, db)| db.version.as_str()),
        ))
    }

    async fn get_top_reclaimable_oracle_databases(&self, filter: &GlobalFilter, limit: usize) -> ServiceResult<Vec<Value>> {
        self.record(
            "get_top_reclaimable_oracle_databases",
            format!("{:?}, {:?}", filter, limit),
        )?;
        let data = self.data.read();
        let mut rows: Vec<(f64, Value)> = data
            .visible_databases(filter)
            .map(|(host, db)| {
                let reclaimable: f64 = db.segment_advisors.iter().map(|s| s.reclaimable).sum();
                (
                    reclaimable,
                    json!({ "hostname": host.hostname, "dbname": db.name, "reclaimableSegmentAdvisors": reclaimable }),
                )
            })
            .collect();
        rows.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(rows.into_iter().take(limit).map(|(_, row)| row).collect())
    }

    async fn get_top_workload_oracle_databases(&self, filter: &GlobalFilter, limit: usize) -> ServiceResult<Vec<Value>> {
        self.record(
            "get_top_workload_oracle_databases",
            format!("{:?}, {:?}", filter, limit),
        )?;
        let data = self.data.read();
        let mut rows: Vec<(f64, Value)> = data
            .visible_databases(filter)
            .map(|(host, db)| {
                (
                    db.work,
                    json!({ "hostname": host.hostname, "dbname": db.name, "workload": db.work }),
                )
            })
            .collect();
        rows.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(rows.into_iter().take(limit).map(|(_, row)| row).collect())
    }

    async fn get_oracle_database_patch_status_stats(
        &self,
        filter: &GlobalFilter,
        window_start: DateTime<Utc>,
    ) -> ServiceResult<Vec<Value>> {
        self.record(
            "get_oracle_database_patch_status_stats",
            format!("{:?}, {:?}", filter, window_start),
        )?;
        let data = self.data.read();
        Ok(count_by(
            "status",
            data.visible_databases(filter).map(|(_, db)| match db.psu_date {
                Some(date) if date >= window_start => "OK",
                _ => "KO",
            }),
        ))
    }

    async fn get_oracle_database_dataguard_status_stats(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>> {
        self.record("get_oracle_database_dataguard_status_stats", format!("{:?}", filter))?;
        let data = self.data.read();
        Ok(status_counts("dataguard", data.visible_databases(filter).map(|(_, db)| db.dataguard)))
    }

    async fn get_oracle_database_rac_status_stats(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>> {
        self.record("get_oracle_database_rac_status_stats", format!("{:?}", filter))?;
        let data = self.data.read();
        Ok(status_counts("rac", data.visible_databases(filter).map(|(_, db)| db.is_rac)))
    }

    async fn get_oracle_database_archivelog_status_stats(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>> {
        self.record("get_oracle_database_archivelog_status_stats", format!("{:?}", filter))?;
        let data = self.data.read();
        Ok(status_counts(
            "archivelog",
            data.visible_databases(filter).map(|(_, db)| db.archivelog),
        ))
    }

    async fn get_total_exadata_memory_size_stats(&self, filter: &GlobalFilter) -> ServiceResult<f64> {
        self.record("get_total_exadata_memory_size_stats", format!("{:?}", filter))?;
        let data = self.data.read();
        Ok(data
            .visible_exadata(filter)
            .flat_map(|e| e.components.iter())
            .map(|c| c.total_memory)
            .sum())
    }

    async fn get_total_exadata_cpu_stats(&self, filter: &GlobalFilter) -> ServiceResult<Value> {
        self.record("get_total_exadata_cpu_stats", format!("{:?}", filter))?;
        let data = self.data.read();
        let (mut enabled, mut total) = (0u64, 0u64);
        for component in data.visible_exadata(filter).flat_map(|e| e.components.iter()) {
            enabled += u64::from(component.cpu_enabled);
            total += component.vms.iter().map(|vm| u64::from(vm.cpu_current)).sum::<u64>()
                .max(u64::from(component.cpu_enabled));
        }
        Ok(json!({ "enabled": enabled, "total": total }))
    }
}

//! Dashboard statistics.
//!
//! Count statistics are arrays of `{"<field>": value, "count": n}` objects.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::error::ServiceResult;
use crate::model::GlobalFilter;

#[async_trait]
pub trait StatsService: Send + Sync {
    async fn get_environment_stats(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>>;
    async fn get_type_stats(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>>;
    async fn get_operating_system_stats(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>>;

    async fn get_oracle_database_environment_stats(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>>;
    async fn get_oracle_database_version_stats(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>>;
    async fn get_top_reclaimable_oracle_databases(&self, filter: &GlobalFilter, limit: usize) -> ServiceResult<Vec<Value>>;
    async fn get_top_workload_oracle_databases(&self, filter: &GlobalFilter, limit: usize) -> ServiceResult<Vec<Value>>;
    /// Count of databases patched after `window_start` (`OK`) versus the rest (`KO`).
    async fn get_oracle_database_patch_status_stats(
        &self,
        filter: &GlobalFilter,
        window_start: DateTime<Utc>,
    ) -> ServiceResult<Vec<Value>>;
    async fn get_oracle_database_dataguard_status_stats(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>>;
    async fn get_oracle_database_rac_status_stats(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>>;
    async fn get_oracle_database_archivelog_status_stats(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>>;

    async fn get_total_exadata_memory_size_stats(&self, filter: &GlobalFilter) -> ServiceResult<f64>;
    /// `{"enabled": n, "total": n}` over all exadata components.
    async fn get_total_exadata_cpu_stats(&self, filter: &GlobalFilter) -> ServiceResult<Value>;
}

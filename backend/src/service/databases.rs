//! Database searches, advisors and license usage.

use async_trait::async_trait;
use serde_json::Value;

use super::error::ServiceResult;
use crate::model::{
    AdvisorFilter, GlobalFilter, LicenseCompliance, MissingDatabase, OracleDatabaseMissingDbs, SearchFilter,
};

/// Service trait for database-level reads.
///
/// The `search_*` methods follow the pagination convention of
/// [`HostService::search_hosts`](super::HostService::search_hosts).
#[async_trait]
pub trait DatabaseService: Send + Sync {
    async fn search_oracle_databases(&self, filter: &SearchFilter) -> ServiceResult<Vec<Value>>;
    async fn search_oracle_databases_as_xlsx(&self, filter: &SearchFilter) -> ServiceResult<Vec<u8>>;

    async fn search_oracle_database_addms(&self, filter: &SearchFilter) -> ServiceResult<Vec<Value>>;
    async fn search_oracle_database_addms_as_xlsx(&self, filter: &SearchFilter) -> ServiceResult<Vec<u8>>;

    async fn search_oracle_database_segment_advisors(&self, filter: &AdvisorFilter) -> ServiceResult<Vec<Value>>;
    async fn search_oracle_database_segment_advisors_as_xlsx(&self, filter: &AdvisorFilter) -> ServiceResult<Vec<u8>>;

    async fn search_oracle_database_patch_advisors(&self, filter: &AdvisorFilter) -> ServiceResult<Vec<Value>>;
    async fn search_oracle_database_patch_advisors_as_xlsx(&self, filter: &AdvisorFilter) -> ServiceResult<Vec<u8>>;

    /// Every database of every technology, flattened to one row each.
    async fn list_all_databases(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>>;
    async fn list_all_databases_as_xlsx(&self, filter: &GlobalFilter) -> ServiceResult<Vec<u8>>;

    async fn get_databases_statistics(&self, filter: &GlobalFilter) -> ServiceResult<Value>;

    async fn get_used_licenses_per_database(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>>;

    async fn get_licenses_compliance(&self, filter: &GlobalFilter) -> ServiceResult<Vec<LicenseCompliance>>;
    async fn get_licenses_compliance_as_xlsx(&self, filter: &GlobalFilter) -> ServiceResult<Vec<u8>>;

    /// Hosts declaring databases their agent did not report.
    async fn get_missing_databases(&self) -> ServiceResult<Vec<OracleDatabaseMissingDbs>>;

    async fn get_missing_databases_by_hostname(&self, hostname: &str) -> ServiceResult<Vec<MissingDatabase>>;

    async fn update_missing_database_ignored_field(
        &self,
        hostname: &str,
        dbname: &str,
        ignored: bool,
        comment: &str,
    ) -> ServiceResult<()>;
}

//! Host inventory operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::error::ServiceResult;
use crate::model::{ClusterDetail, GlobalFilter, Host, HostsMode, PatchingFunction, PatchingFunctionRequest, SearchFilter, User};

/// Service trait for hosts, their databases' tags and license flags.
#[async_trait]
pub trait HostService: Send + Sync {
    /// Search hosts. When the filter is paged the result holds a single
    /// page object; otherwise it holds every matching row.
    async fn search_hosts(&self, mode: HostsMode, filter: &SearchFilter) -> ServiceResult<Vec<Value>>;

    async fn search_hosts_as_xlsx(&self, filter: &SearchFilter) -> ServiceResult<Vec<u8>>;

    async fn get_host(&self, hostname: &str) -> ServiceResult<Host>;

    /// Mark a host as archived; archived hosts disappear from searches.
    async fn archive_host(&self, hostname: &str) -> ServiceResult<()>;

    async fn get_patching_function(&self, hostname: &str) -> ServiceResult<PatchingFunction>;

    async fn set_patching_function(
        &self,
        hostname: &str,
        request: PatchingFunctionRequest,
    ) -> ServiceResult<PatchingFunction>;

    /// Remove the host's patching function; a host without one is left as is.
    async fn delete_patching_function(&self, hostname: &str) -> ServiceResult<()>;

    async fn add_tag_to_oracle_database(&self, hostname: &str, dbname: &str, tag: &str) -> ServiceResult<()>;

    async fn delete_tag_of_oracle_database(&self, hostname: &str, dbname: &str, tag: &str) -> ServiceResult<()>;

    async fn set_license_ignored_field(
        &self,
        hostname: &str,
        dbname: &str,
        license_type_id: &str,
        ignored: bool,
    ) -> ServiceResult<()>;

    /// Search the hypervisor clusters of visible hosts. `full` keeps the
    /// virtual machines in each row.
    async fn search_clusters(&self, full: bool, filter: &SearchFilter) -> ServiceResult<Vec<Value>>;

    async fn search_clusters_as_xlsx(&self, filter: &SearchFilter) -> ServiceResult<Vec<u8>>;

    /// Cluster named `name`, as reported by a host created before `older_than`.
    async fn get_cluster(&self, name: &str, older_than: DateTime<Utc>) -> ServiceResult<ClusterDetail>;

    async fn list_locations(&self, filter: &GlobalFilter) -> ServiceResult<Vec<String>>;

    async fn list_environments(&self, filter: &GlobalFilter) -> ServiceResult<Vec<String>>;

    /// Locations the user may see. Administrators see every location.
    async fn list_user_locations(&self, user: &User) -> ServiceResult<Vec<String>>;
}

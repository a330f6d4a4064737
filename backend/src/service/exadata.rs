use async_trait::async_trait;

use super::error::ServiceResult;
use crate::model::{ExadataInstance, ExadataPatchAdvisor, ExadataRdma, GlobalFilter};

/// Service trait for Oracle Exadata racks.
#[async_trait]
pub trait ExadataService: Send + Sync {
    /// List racks matching the filter, either the visible or the hidden ones.
    async fn list_exadata_instances(&self, filter: &GlobalFilter, hidden: bool) -> ServiceResult<Vec<ExadataInstance>>;

    async fn get_exadata_instance(&self, rack_id: &str) -> ServiceResult<ExadataInstance>;

    async fn update_exadata_vm_cluster_name(
        &self,
        rack_id: &str,
        host_id: &str,
        vm_name: &str,
        cluster_name: &str,
    ) -> ServiceResult<()>;

    async fn update_exadata_component_cluster_names(
        &self,
        rack_id: &str,
        host_id: &str,
        cluster_names: Vec<String>,
    ) -> ServiceResult<()>;

    async fn update_exadata_rdma(&self, rack_id: &str, rdma: ExadataRdma) -> ServiceResult<()>;

    async fn hide_exadata_instance(&self, rack_id: &str) -> ServiceResult<()>;

    async fn show_exadata_instance(&self, rack_id: &str) -> ServiceResult<()>;

    async fn get_exadata_patch_advisors(&self, rack_id: &str) -> ServiceResult<Vec<ExadataPatchAdvisor>>;

    async fn get_all_exadata_instances_as_xlsx(&self) -> ServiceResult<Vec<u8>>;

    async fn get_all_exadata_patch_advisors_as_xlsx(&self) -> ServiceResult<Vec<u8>>;
}

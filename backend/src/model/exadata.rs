use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExadataInstance {
    #[serde(rename = "rackID")]
    pub rack_id: String,
    pub hostname: String,
    pub environment: String,
    pub location: String,
    pub hidden: bool,
    pub components: Vec<ExadataComponent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rdma: Option<ExadataRdma>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExadataComponent {
    #[serde(rename = "hostID")]
    pub host_id: String,
    pub hostname: String,
    pub host_type: String,
    pub cluster_names: Vec<String>,
    pub total_memory: f64,
    pub cpu_enabled: u32,
    pub image_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<DateTime<Utc>>,
    pub vms: Vec<ExadataVm>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExadataVm {
    pub name: String,
    pub cluster_name: String,
    pub ram_current: f64,
    pub cpu_current: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ExadataRdma {
    pub network: String,
    pub ip_addresses: Vec<String>,
}

/// Body of the VM cluster-name update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct VmClusterNameUpdate {
    pub cluster_name: String,
}

/// Body of the component cluster-names update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ComponentClusterNamesUpdate {
    pub cluster_names: Vec<String>,
}

/// Patch freshness of one exadata component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExadataPatchAdvisor {
    #[serde(rename = "rackID")]
    pub rack_id: String,
    pub hostname: String,
    pub image_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<DateTime<Utc>>,
    pub four_months: bool,
    pub six_months: bool,
    pub twelve_months: bool,
}

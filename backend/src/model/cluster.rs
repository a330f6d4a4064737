//! Hypervisor clusters reported by the hosts running their management agent.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cluster {
    pub name: String,
    #[serde(rename = "type")]
    pub cluster_type: String,
    pub cpu: u32,
    pub sockets: u32,
    pub vms: Vec<VirtualMachine>,
}

impl Cluster {
    /// Distinct hypervisor nodes the virtual machines run on, sorted.
    pub fn physical_hosts(&self) -> Vec<String> {
        self.vms
            .iter()
            .map(|vm| vm.virtualization_node.clone())
            .filter(|node| !node.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VirtualMachine {
    pub name: String,
    pub hostname: String,
    #[serde(rename = "cappedCPU")]
    pub capped_cpu: bool,
    pub virtualization_node: String,
}

/// A cluster together with the host that reported it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDetail {
    pub name: String,
    #[serde(rename = "type")]
    pub cluster_type: String,
    pub cpu: u32,
    pub sockets: u32,
    /// Host whose agent reported the cluster.
    pub hostname: String,
    pub location: String,
    pub environment: String,
    pub created_at: DateTime<Utc>,
    pub physical_hosts: Vec<String>,
    pub vms_count: usize,
    pub vms: Vec<VirtualMachine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vm(name: &str, node: &str) -> VirtualMachine {
        VirtualMachine {
            name: name.to_string(),
            hostname: format!("{}.example", name),
            virtualization_node: node.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_physical_hosts_are_distinct() {
        let cluster = Cluster {
            name: "Puzzait".to_string(),
            vms: vec![vm("a", "esxi2"), vm("b", "esxi1"), vm("c", "esxi2"), vm("d", "")],
            ..Default::default()
        };
        assert_eq!(cluster.physical_hosts(), vec!["esxi1", "esxi2"]);
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Months, Utc};
use serde_json::{json, Value};

use super::{not_found, records_workbook, to_rows, LocalData, LocalService};
use crate::model::{ExadataInstance, ExadataPatchAdvisor, ExadataRdma, GlobalFilter};
use crate::service::error::{ErrorKind, ServiceResult};
use crate::service::ExadataService;

fn released_within(release: Option<DateTime<Utc>>, now: DateTime<Utc>, months: u32) -> bool {
    match (release, now.checked_sub_months(Months::new(months))) {
        (Some(release), Some(start)) => release >= start,
        _ => false,
    }
}

fn patch_advisors(instance: &ExadataInstance, now: DateTime<Utc>) -> Vec<ExadataPatchAdvisor> {
    instance
        .components
        .iter()
        .map(|component| ExadataPatchAdvisor {
            rack_id: instance.rack_id.clone(),
            hostname: component.hostname.clone(),
            image_version: component.image_version.clone(),
            release_date: component.release_date,
            four_months: released_within(component.release_date, now, 4),
            six_months: released_within(component.release_date, now, 6),
            twelve_months: released_within(component.release_date, now, 12),
        })
        .collect()
}

impl LocalData {
    fn exadata_mut(&mut self, rack_id: &str) -> ServiceResult<&mut ExadataInstance> {
        self.exadata
            .iter_mut()
            .find(|e| e.rack_id == rack_id)
            .ok_or_else(|| not_found(ErrorKind::ExadataNotFound, rack_id))
    }

    pub(super) fn visible_exadata<'a>(
        &'a self,
        filter: &'a GlobalFilter,
    ) -> impl Iterator<Item = &'a ExadataInstance> + 'a {
        self.exadata
            .iter()
            .filter(move |e| filter.matches(&e.location, &e.environment, e.created_at))
    }
}

#[async_trait]
impl ExadataService for LocalService {
    async fn list_exadata_instances(&self, filter: &GlobalFilter, hidden: bool) -> ServiceResult<Vec<ExadataInstance>> {
        self.record("list_exadata_instances", format!("{:?}, {:?}", filter, hidden))?;
        let data = self.data.read();
        Ok(data
            .visible_exadata(filter)
            .filter(|e| e.hidden == hidden)
            .cloned()
            .collect())
    }

    async fn get_exadata_instance(&self, rack_id: &str) -> ServiceResult<ExadataInstance> {
        self.record("get_exadata_instance", format!("{:?}", rack_id))?;
        self.data
            .read()
            .exadata
            .iter()
            .find(|e| e.rack_id == rack_id)
            .cloned()
            .ok_or_else(|| not_found(ErrorKind::ExadataNotFound, rack_id))
    }

    async fn update_exadata_vm_cluster_name(
        &self,
        rack_id: &str,
        host_id: &str,
        vm_name: &str,
        cluster_name: &str,
    ) -> ServiceResult<()> {
        self.record(
            "update_exadata_vm_cluster_name",
            format!("{:?}, {:?}, {:?}, {:?}", rack_id, host_id, vm_name, cluster_name),
        )?;
        let mut data = self.data.write();
        let vm = data
            .exadata_mut(rack_id)?
            .components
            .iter_mut()
            .find(|c| c.host_id == host_id)
            .ok_or_else(|| not_found(ErrorKind::NotFound, host_id))?
            .vms
            .iter_mut()
            .find(|vm| vm.name == vm_name)
            .ok_or_else(|| not_found(ErrorKind::NotFound, vm_name))?;
        vm.cluster_name = cluster_name.to_string();
        Ok(())
    }

    async fn update_exadata_component_cluster_names(
        &self,
        rack_id: &str,
        host_id: &str,
        cluster_names: Vec<String>,
    ) -> ServiceResult<()> {
        self.record(
            "update_exadata_component_cluster_names",
            format!("{:?}, {:?}, {:?}", rack_id, host_id, cluster_names),
        )?;
        let mut data = self.data.write();
        let component = data
            .exadata_mut(rack_id)?
            .components
            .iter_mut()
            .find(|c| c.host_id == host_id)
            .ok_or_else(|| not_found(ErrorKind::NotFound, host_id))?;
        component.cluster_names = cluster_names;
        Ok(())
    }

    async fn update_exadata_rdma(&self, rack_id: &str, rdma: ExadataRdma) -> ServiceResult<()> {
        self.record("update_exadata_rdma", format!("{:?}, {:?}", rack_id, rdma))?;
        self.data.write().exadata_mut(rack_id)?.rdma = Some(rdma);
        Ok(())
    }

    async fn hide_exadata_instance(&self, rack_id: &str) -> ServiceResult<()> {
        self.record("hide_exadata_instance", format!("{:?}", rack_id))?;
        self.data.write().exadata_mut(rack_id)?.hidden = true;
        Ok(())
    }

    async fn show_exadata_instance(&self, rack_id: &str) -> ServiceResult<()> {
        self.record("show_exadata_instance", format!("{:?}", rack_id))?;
        self.data.write().exadata_mut(rack_id)?.hidden = false;
        Ok(())
    }

    async fn get_exadata_patch_advisors(&self, rack_id: &str) -> ServiceResult<Vec<ExadataPatchAdvisor>> {
        self.record("get_exadata_patch_advisors", format!("{:?}", rack_id))?;
        let now = self.now();
        let data = self.data.read();
        let instance = data
            .exadata
            .iter()
            .find(|e| e.rack_id == rack_id)
            .ok_or_else(|| not_found(ErrorKind::ExadataNotFound, rack_id))?;
        Ok(patch_advisors(instance, now))
    }

    async fn get_all_exadata_instances_as_xlsx(&self) -> ServiceResult<Vec<u8>> {
        self.record("get_all_exadata_instances_as_xlsx", String::new())?;
        let rows: Vec<Value> = {
            let data = self.data.read();
            data.exadata
                .iter()
                .filter(|e| !e.hidden)
                .flat_map(|e| {
                    e.components.iter().map(move |c| {
                        json!({
                            "rackID": e.rack_id,
                            "hostname": e.hostname,
                            "componentHostname": c.hostname,
                            "hostType": c.host_type,
                            "imageVersion": c.image_version,
                            "cpuEnabled": c.cpu_enabled,
                            "totalMemory": c.total_memory,
                            "clusterNames": c.cluster_names,
                        })
                    })
                })
                .collect()
        };
        records_workbook(
            "Exadata",
            &["Rack ID", "Hostname", "Component", "Type", "Image Version", "CPU Enabled", "Total Memory", "Cluster Names"],
            &["rackID", "hostname", "componentHostname", "hostType", "imageVersion", "cpuEnabled", "totalMemory", "clusterNames"],
            &rows,
        )
    }

    async fn get_all_exadata_patch_advisors_as_xlsx(&self) -> ServiceResult<Vec<u8>> {
        self.record("get_all_exadata_patch_advisors_as_xlsx", String::new())?;
        let now = self.now();
        let advisors: Vec<ExadataPatchAdvisor> = {
            let data = self.data.read();
            data.exadata
                .iter()
                .filter(|e| !e.hidden)
                .flat_map(|e| patch_advisors(e, now))
                .collect()
        };
        records_workbook(
            "Patch Advisor",
            &["Rack ID", "Hostname", "Image Version", "Release Date", "4 Months", "6 Months", "12 Months"],
            &["rackID", "hostname", "imageVersion", "releaseDate", "fourMonths", "sixMonths", "twelveMonths"],
            &to_rows(&advisors)?,
        )
    }
}

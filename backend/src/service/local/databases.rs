use async_trait::async_trait;
use serde_json::{json, Value};

use super::scenarios::{scaled, CoreScaling};
use super::{not_found, records_workbook, search_rows, to_rows, LocalData, LocalService};
use crate::model::{
    AdvisorFilter, GlobalFilter, Host, LicenseCompliance, MissingDatabase, OracleDatabase, OracleDatabaseMissingDbs,
    SearchFilter,
};
use crate::service::error::{ErrorKind, ServiceResult};
use crate::service::DatabaseService;

const ORACLE_DATABASE_TYPE: &str = "Oracle/Database";

fn database_row(host: &Host, db: &OracleDatabase) -> Value {
    json!({
        "hostname": host.hostname,
        "location": host.location,
        "environment": host.environment,
        "name": db.name,
        "version": db.version,
        "status": db.status,
        "work": db.work,
        "memory": db.memory,
        "datafileSize": db.datafile_size,
        "segmentsSize": db.segments_size,
        "archivelog": db.archivelog,
        "dataguard": db.dataguard,
        "isRAC": db.is_rac,
        "tags": db.tags,
    })
}

impl LocalData {
    /// Every database of the visible hosts, with its host.
    pub(super) fn visible_databases<'a>(
        &'a self,
        filter: &'a GlobalFilter,
    ) -> impl Iterator<Item = (&'a Host, &'a OracleDatabase)> + 'a {
        self.visible_hosts(filter)
            .flat_map(|host| host.oracle_databases.iter().map(move |db| (host, db)))
    }

    fn database_rows(&self, filter: &GlobalFilter) -> Vec<Value> {
        self.visible_databases(filter)
            .map(|(host, db)| database_row(host, db))
            .collect()
    }

    fn addm_rows(&self, filter: &GlobalFilter) -> Vec<Value> {
        self.visible_databases(filter)
            .flat_map(|(host, db)| {
                db.addms.iter().map(move |addm| {
                    json!({
                        "hostname": host.hostname,
                        "location": host.location,
                        "environment": host.environment,
                        "dbname": db.name,
                        "finding": addm.finding,
                        "recommendation": addm.recommendation,
                        "action": addm.action,
                        "benefit": addm.benefit,
                    })
                })
            })
            .collect()
    }

    fn segment_advisor_rows(&self, filter: &AdvisorFilter) -> Vec<Value> {
        self.visible_databases(&filter.search.global)
            .filter(|(host, _)| host.created_at >= filter.window_start)
            .flat_map(|(host, db)| {
                db.segment_advisors.iter().map(move |advisor| {
                    json!({
                        "hostname": host.hostname,
                        "location": host.location,
                        "environment": host.environment,
                        "dbname": db.name,
                        "segmentOwner": advisor.segment_owner,
                        "segmentName": advisor.segment_name,
                        "segmentType": advisor.segment_type,
                        "partitionName": advisor.partition_name,
                        "reclaimable": advisor.reclaimable,
                        "recommendation": advisor.recommendation,
                    })
                })
            })
            .collect()
    }

    fn patch_advisor_rows(&self, filter: &AdvisorFilter) -> Vec<Value> {
        self.visible_databases(&filter.search.global)
            .filter_map(|(host, db)| {
                let status = match db.psu_date {
                    Some(date) if date >= filter.window_start => "OK",
                    _ => "KO",
                };
                if !filter.status.is_empty() && filter.status != status {
                    return None;
                }
                Some(json!({
                    "hostname": host.hostname,
                    "location": host.location,
                    "environment": host.environment,
                    "dbname": db.name,
                    "version": db.version,
                    "psuDate": db.psu_date,
                    "status": status,
                }))
            })
            .collect()
    }

    fn all_database_rows(&self, filter: &GlobalFilter) -> Vec<Value> {
        self.visible_databases(filter)
            .map(|(host, db)| {
                json!({
                    "name": db.name,
                    "type": ORACLE_DATABASE_TYPE,
                    "version": db.version,
                    "hostname": host.hostname,
                    "environment": host.environment,
                    "location": host.location,
                    "memory": db.memory,
                    "datafileSize": db.datafile_size,
                    "segmentsSize": db.segments_size,
                    "archivelog": db.archivelog,
                    "ha": db.dataguard || db.is_rac,
                    "dataguard": db.dataguard,
                })
            })
            .collect()
    }

    fn licenses_compliance(&self, filter: &GlobalFilter) -> Vec<LicenseCompliance> {
        self.licenses_compliance_scaled(filter, &CoreScaling::new())
    }

    /// Compliance with the license counts of some hosts scaled.
    pub(super) fn licenses_compliance_scaled(
        &self,
        filter: &GlobalFilter,
        scaling: &CoreScaling,
    ) -> Vec<LicenseCompliance> {
        self.oracle_license_types
            .iter()
            .filter_map(|lt| {
                let consumed: f64 = self
                    .visible_databases(filter)
                    .flat_map(|(host, db)| db.licenses.iter().map(move |l| (host, l)))
                    .filter(|(_, l)| l.license_type_id == lt.id && !l.ignored)
                    .map(|(host, l)| scaled(scaling, &host.hostname, l.count))
                    .sum();
                let contracts: Vec<_> = self
                    .oracle_contracts
                    .iter()
                    .filter(|c| c.license_type_id == lt.id)
                    .collect();
                if consumed == 0.0 && contracts.is_empty() {
                    return None;
                }
                let unlimited = contracts.iter().any(|c| c.unlimited);
                let purchased: f64 = contracts.iter().map(|c| c.count as f64).sum();
                let covered = if unlimited { consumed } else { consumed.min(purchased) };
                let compliance = if consumed == 0.0 { 1.0 } else { covered / consumed };
                Some(LicenseCompliance {
                    license_type_id: lt.id.clone(),
                    item_description: lt.item_description.clone(),
                    metric: lt.metric.clone(),
                    consumed,
                    covered,
                    compliance,
                    unlimited,
                })
            })
            .collect()
    }
}

#[async_trait]
impl DatabaseService for LocalService {
    async fn search_oracle_databases(&self, filter: &SearchFilter) -> ServiceResult<Vec<Value>> {
        self.record("search_oracle_databases", format!("{:?}", filter))?;
        let rows = self.data.read().database_rows(&filter.global);
        Ok(search_rows(rows, filter))
    }

    async fn search_oracle_databases_as_xlsx(&self, filter: &SearchFilter) -> ServiceResult<Vec<u8>> {
        self.record("search_oracle_databases_as_xlsx", format!("{:?}", filter))?;
        let rows = self.data.read().database_rows(&filter.global);
        let rows = search_rows(rows, &filter.unpaged());
        records_workbook(
            "Databases",
            &["Hostname", "Name", "Version", "Status", "Environment", "Memory", "Datafile Size", "Segments Size", "Archivelog", "Dataguard", "RAC"],
            &["hostname", "name", "version", "status", "environment", "memory", "datafileSize", "segmentsSize", "archivelog", "dataguard", "isRAC"],
            &rows,
        )
    }

    async fn search_oracle_database_addms(&self, filter: &SearchFilter) -> ServiceResult<Vec<Value>> {
        self.record("search_oracle_database_addms", format!("{:?}", filter))?;
        let rows = self.data.read().addm_rows(&filter.global);
        Ok(search_rows(rows, filter))
    }

    async fn search_oracle_database_addms_as_xlsx(&self, filter: &SearchFilter) -> ServiceResult<Vec<u8>> {
        self.record("search_oracle_database_addms_as_xlsx", format!("{:?}", filter))?;
        let rows = self.data.read().addm_rows(&filter.global);
        let rows = search_rows(rows, &filter.unpaged());
        records_workbook(
            "Addm",
            &["Hostname", "Database", "Environment", "Finding", "Recommendation", "Action", "Benefit"],
            &["hostname", "dbname", "environment", "finding", "recommendation", "action", "benefit"],
            &rows,
        )
    }

    async fn search_oracle_database_segment_advisors(&self, filter: &AdvisorFilter) -> ServiceResult<Vec<Value>> {
        self.record("search_oracle_database_segment_advisors", format!("{:?}", filter))?;
        let rows = self.data.read().segment_advisor_rows(filter);
        Ok(search_rows(rows, &filter.search))
    }

    async fn search_oracle_database_segment_advisors_as_xlsx(&self, filter: &AdvisorFilter) -> ServiceResult<Vec<u8>> {
        self.record("search_oracle_database_segment_advisors_as_xlsx", format!("{:?}", filter))?;
        let rows = self.data.read().segment_advisor_rows(filter);
        let rows = search_rows(rows, &filter.search.unpaged());
        records_workbook(
            "Segment_Advisor",
            &["Hostname", "Database", "Segment Owner", "Segment Name", "Segment Type", "Partition Name", "Reclaimable", "Recommendation"],
            &["hostname", "dbname", "segmentOwner", "segmentName", "segmentType", "partitionName", "reclaimable", "recommendation"],
            &rows,
        )
    }

    async fn search_oracle_database_patch_advisors(&self, filter: &AdvisorFilter) -> ServiceResult<Vec<Value>> {
        self.record("search_oracle_database_patch_advisors", format!("{:?}", filter))?;
        let rows = self.data.read().patch_advisor_rows(filter);
        Ok(search_rows(rows, &filter.search))
    }

    async fn search_oracle_database_patch_advisors_as_xlsx(&self, filter: &AdvisorFilter) -> ServiceResult<Vec<u8>> {
        self.record("search_oracle_database_patch_advisors_as_xlsx", format!("{:?}", filter))?;
        let rows = self.data.read().patch_advisor_rows(filter);
        let rows = search_rows(rows, &filter.search.unpaged());
        records_workbook(
            "Patch_Advisor",
            &["Hostname", "Database", "Environment", "Version", "PSU Date", "Status"],
            &["hostname", "dbname", "environment", "version", "psuDate", "status"],
            &rows,
        )
    }

    async fn list_all_databases(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>> {
        self.record("list_all_databases", format!("{:?}", filter))?;
        Ok(self.data.read().all_database_rows(filter))
    }

    async fn list_all_databases_as_xlsx(&self, filter: &GlobalFilter) -> ServiceResult<Vec<u8>> {
        self.record("list_all_databases_as_xlsx", format!("{:?}", filter))?;
        let rows = self.data.read().all_database_rows(filter);
        records_workbook(
            "Databases",
            &["Type", "Version", "Hostname", "Location", "Environment", "Name", "Memory", "Datafile Size", "Segments Size", "Archivelog", "HA", "Dataguard"],
            &["type", "version", "hostname", "location", "environment", "name", "memory", "datafileSize", "segmentsSize", "archivelog", "ha", "dataguard"],
            &rows,
        )
    }

    async fn get_databases_statistics(&self, filter: &GlobalFilter) -> ServiceResult<Value> {
        self.record("get_databases_statistics", format!("{:?}", filter))?;
        let data = self.data.read();
        let (mut memory, mut segments, mut datafiles, mut count) = (0.0, 0.0, 0.0, 0usize);
        for (_, db) in data.visible_databases(filter) {
            memory += db.memory;
            segments += db.segments_size;
            datafiles += db.datafile_size;
            count += 1;
        }
        Ok(json!({
            "count": count,
            "totalMemorySize": memory,
            "totalSegmentsSize": segments,
            "totalDatafileSize": datafiles,
        }))
    }

    async fn get_used_licenses_per_database(&self, filter: &GlobalFilter) -> ServiceResult<Vec<Value>> {
        self.record("get_used_licenses_per_database", format!("{:?}", filter))?;
        let data = self.data.read();
        Ok(data
            .visible_databases(filter)
            .flat_map(|(host, db)| db.licenses.iter().map(move |l| (host, db, l)))
            .map(|(host, db, license)| {
                let info = data.license_type_info(&license.license_type_id);
                json!({
                    "hostname": host.hostname,
                    "dbName": db.name,
                    "licenseTypeID": license.license_type_id,
                    "description": info.item_description,
                    "metric": info.metric,
                    "usedLicenses": license.count,
                    "ignored": license.ignored,
                })
            })
            .collect())
    }

    async fn get_licenses_compliance(&self, filter: &GlobalFilter) -> ServiceResult<Vec<LicenseCompliance>> {
        self.record("get_licenses_compliance", format!("{:?}", filter))?;
        Ok(self.data.read().licenses_compliance(filter))
    }

    async fn get_licenses_compliance_as_xlsx(&self, filter: &GlobalFilter) -> ServiceResult<Vec<u8>> {
        self.record("get_licenses_compliance_as_xlsx", format!("{:?}", filter))?;
        let compliance = self.data.read().licenses_compliance(filter);
        records_workbook(
            "Licenses Compliance",
            &["Part Number", "Description", "Metric", "Consumed", "Covered", "Compliance", "Unlimited"],
            &["licenseTypeID", "itemDescription", "metric", "consumed", "covered", "compliance", "unlimited"],
            &to_rows(&compliance)?,
        )
    }

    async fn get_missing_databases(&self) -> ServiceResult<Vec<OracleDatabaseMissingDbs>> {
        self.record("get_missing_databases", String::new())?;
        let data = self.data.read();
        let everywhere = GlobalFilter::default();
        let missing = data
            .visible_hosts(&everywhere)
            .filter(|host| !host.missing_databases.is_empty())
            .map(|host| OracleDatabaseMissingDbs {
                hostname: host.hostname.clone(),
                missing_databases: host.missing_databases.clone(),
            })
            .collect();
        Ok(missing)
    }

    async fn get_missing_databases_by_hostname(&self, hostname: &str) -> ServiceResult<Vec<MissingDatabase>> {
        self.record("get_missing_databases_by_hostname", format!("{:?}", hostname))?;
        self.data
            .read()
            .hosts
            .get(hostname)
            .filter(|h| !h.archived)
            .map(|h| h.missing_databases.clone())
            .ok_or_else(|| not_found(ErrorKind::HostNotFound, hostname))
    }

    async fn update_missing_database_ignored_field(
        &self,
        hostname: &str,
        dbname: &str,
        ignored: bool,
        comment: &str,
    ) -> ServiceResult<()> {
        self.record(
            "update_missing_database_ignored_field",
            format!("{:?}, {:?}, {:?}, {:?}", hostname, dbname, ignored, comment),
        )?;
        let mut data = self.data.write();
        let missing = data
            .live_host_mut(hostname)?
            .missing_databases
            .iter_mut()
            .find(|db| db.name == dbname)
            .ok_or_else(|| not_found(ErrorKind::NotFound, dbname))?;
        missing.ignored = ignored;
        missing.ignored_comment = if ignored { comment.to_string() } else { String::new() };
        Ok(())
    }
}

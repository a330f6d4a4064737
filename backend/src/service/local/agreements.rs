use async_trait::async_trait;

use super::{not_found, LocalData, LocalService};
use crate::model::filter::{flag_matches, text_matches};
use crate::model::{
    MySqlAgreement, ObjectId, OracleDatabaseAgreement, OracleDatabaseAgreementFe, OracleDatabaseAgreementPart,
    OracleDatabaseAgreementsFilter,
};
use crate::service::error::{ErrorKind, ServiceError, ServiceResult};
use crate::service::AgreementService;

impl LocalData {
    fn agreement_fe(&self, agreement: &OracleDatabaseAgreement) -> OracleDatabaseAgreementFe {
        let info = self.license_type_info(&agreement.license_type_id);
        let (hosts, available) = self.coverage(
            &agreement.license_type_id,
            agreement.count,
            agreement.unlimited,
            &agreement.hosts,
        );
        let count = agreement.count as f64;
        let (per_core, per_user, available_core, available_user) = if info.named_user {
            (0.0, count, 0.0, available)
        } else {
            (count, 0.0, available, 0.0)
        };
        OracleDatabaseAgreementFe {
            id: agreement.id,
            agreement_id: agreement.agreement_id.clone(),
            csi: agreement.csi.clone(),
            license_type_id: agreement.license_type_id.clone(),
            item_description: info.item_description,
            metric: info.metric,
            reference_number: agreement.reference_number.clone(),
            unlimited: agreement.unlimited,
            catch_all: agreement.catch_all,
            restricted: agreement.restricted,
            hosts,
            licenses_per_core: per_core,
            licenses_per_user: per_user,
            available_licenses_per_core: available_core,
            available_licenses_per_user: available_user,
        }
    }

    fn check_license_type(&self, id: &str) -> ServiceResult<()> {
        match self.oracle_license_type(id) {
            Some(_) => Ok(()),
            None => Err(not_found(ErrorKind::LicenseTypeIdNotFound, id)),
        }
    }

    fn agreement_mut(&mut self, id: ObjectId) -> ServiceResult<&mut OracleDatabaseAgreement> {
        self.agreements
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| not_found(ErrorKind::AgreementNotFound, id))
    }
}

fn agreement_matches(filter: &OracleDatabaseAgreementsFilter, agreement: &OracleDatabaseAgreementFe) -> bool {
    text_matches(&filter.agreement_id, &agreement.agreement_id)
        && text_matches(&filter.license_type_id, &agreement.license_type_id)
        && text_matches(&filter.item_description, &agreement.item_description)
        && text_matches(&filter.csi, &agreement.csi)
        && text_matches(&filter.metric, &agreement.metric)
        && text_matches(&filter.reference_number, &agreement.reference_number)
        && flag_matches(filter.unlimited, agreement.unlimited)
        && flag_matches(filter.catch_all, agreement.catch_all)
        && filter.licenses_per_core.contains(agreement.licenses_per_core)
        && filter.licenses_per_user.contains(agreement.licenses_per_user)
        && filter
            .available_licenses_per_core
            .contains(agreement.available_licenses_per_core)
        && filter
            .available_licenses_per_user
            .contains(agreement.available_licenses_per_user)
}

#[async_trait]
impl AgreementService for LocalService {
    async fn add_oracle_database_agreement(
        &self,
        mut agreement: OracleDatabaseAgreement,
    ) -> ServiceResult<OracleDatabaseAgreementFe> {
        self.record("add_oracle_database_agreement", format!("{:?}", agreement))?;
        let mut data = self.data.write();
        data.check_license_type(&agreement.license_type_id)?;
        agreement.id = ObjectId::generate();
        let fe = data.agreement_fe(&agreement);
        data.agreements.push(agreement);
        Ok(fe)
    }

    async fn update_oracle_database_agreement(
        &self,
        agreement: OracleDatabaseAgreement,
    ) -> ServiceResult<OracleDatabaseAgreementFe> {
        self.record("update_oracle_database_agreement", format!("{:?}", agreement))?;
        let mut data = self.data.write();
        data.check_license_type(&agreement.license_type_id)?;
        *data.agreement_mut(agreement.id)? = agreement.clone();
        Ok(data.agreement_fe(&agreement))
    }

    async fn get_oracle_database_agreements(
        &self,
        filter: &OracleDatabaseAgreementsFilter,
    ) -> ServiceResult<Vec<OracleDatabaseAgreementFe>> {
        self.record("get_oracle_database_agreements", format!("{:?}", filter))?;
        let data = self.data.read();
        Ok(data
            .agreements
            .iter()
            .map(|a| data.agreement_fe(a))
            .filter(|a| agreement_matches(filter, a))
            .collect())
    }

    async fn delete_oracle_database_agreement(&self, id: ObjectId) -> ServiceResult<()> {
        self.record("delete_oracle_database_agreement", format!("{:?}", id))?;
        let mut data = self.data.write();
        let before = data.agreements.len();
        data.agreements.retain(|a| a.id != id);
        if data.agreements.len() == before {
            return Err(not_found(ErrorKind::AgreementNotFound, id));
        }
        Ok(())
    }

    async fn add_host_to_oracle_database_agreement(&self, id: ObjectId, hostname: &str) -> ServiceResult<()> {
        self.record(
            "add_host_to_oracle_database_agreement",
            format!("{:?}, {:?}", id, hostname),
        )?;
        let mut data = self.data.write();
        if !data.host_outside_cluster(hostname) {
            return Err(not_found(ErrorKind::NotInClusterHostNotFound, hostname));
        }
        let agreement = data.agreement_mut(id)?;
        if !agreement.hosts.iter().any(|h| h == hostname) {
            agreement.hosts.push(hostname.to_string());
        }
        Ok(())
    }

    async fn delete_host_from_oracle_database_agreement(&self, id: ObjectId, hostname: &str) -> ServiceResult<()> {
        self.record(
            "delete_host_from_oracle_database_agreement",
            format!("{:?}, {:?}", id, hostname),
        )?;
        let mut data = self.data.write();
        let agreement = data.agreement_mut(id)?;
        let before = agreement.hosts.len();
        agreement.hosts.retain(|h| h != hostname);
        if agreement.hosts.len() == before {
            return Err(ServiceError::new(ErrorKind::NotFound).with_message(hostname.to_string()));
        }
        Ok(())
    }

    async fn get_oracle_database_agreement_parts(&self) -> ServiceResult<Vec<OracleDatabaseAgreementPart>> {
        self.record("get_oracle_database_agreement_parts", String::new())?;
        let data = self.data.read();
        Ok(data.agreement_parts.clone())
    }

    async fn add_mysql_agreement(&self, mut agreement: MySqlAgreement) -> ServiceResult<MySqlAgreement> {
        self.record("add_mysql_agreement", format!("{:?}", agreement))?;
        agreement.id = ObjectId::generate();
        self.data.write().mysql_agreements.push(agreement.clone());
        Ok(agreement)
    }

    async fn update_mysql_agreement(&self, agreement: MySqlAgreement) -> ServiceResult<MySqlAgreement> {
        self.record("update_mysql_agreement", format!("{:?}", agreement))?;
        let mut data = self.data.write();
        let stored = data
            .mysql_agreements
            .iter_mut()
            .find(|a| a.id == agreement.id)
            .ok_or_else(|| not_found(ErrorKind::NotFound, agreement.id))?;
        *stored = agreement.clone();
        Ok(agreement)
    }

    async fn get_mysql_agreements(&self) -> ServiceResult<Vec<MySqlAgreement>> {
        self.record("get_mysql_agreements", String::new())?;
        Ok(self.data.read().mysql_agreements.clone())
    }

    async fn delete_mysql_agreement(&self, id: ObjectId) -> ServiceResult<()> {
        self.record("delete_mysql_agreement", format!("{:?}", id))?;
        let mut data = self.data.write();
        let before = data.mysql_agreements.len();
        data.mysql_agreements.retain(|a| a.id != id);
        if data.mysql_agreements.len() == before {
            return Err(not_found(ErrorKind::NotFound, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DatabaseLicense, Host, OracleDatabase, OracleDatabaseLicenseType};

    fn seeded() -> LocalService {
        let service = LocalService::new();
        service.seed_oracle_license_type(OracleDatabaseLicenseType {
            id: "PID001".to_string(),
            item_description: "Oracle Real Application Clusters".to_string(),
            metric: "Processor Perpetual".to_string(),
            ..Default::default()
        });
        service.seed_host(Host {
            hostname: "foobar".to_string(),
            oracle_databases: vec![OracleDatabase {
                name: "ERCOLE".to_string(),
                licenses: vec![DatabaseLicense {
                    license_type_id: "PID001".to_string(),
                    count: 3.0,
                    ignored: false,
                }],
                ..Default::default()
            }],
            ..Default::default()
        });
        service.seed_host(Host {
            hostname: "clustered".to_string(),
            cluster: Some("vcenter".to_string()),
            ..Default::default()
        });
        service
    }

    #[tokio::test]
    async fn test_add_computes_coverage() {
        let service = seeded();
        let fe = service
            .add_oracle_database_agreement(OracleDatabaseAgreement {
                agreement_id: "AID001".to_string(),
                license_type_id: "PID001".to_string(),
                count: 5,
                hosts: vec!["foobar".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(!fe.id.is_nil());
        assert_eq!(fe.item_description, "Oracle Real Application Clusters");
        assert_eq!(fe.licenses_per_core, 5.0);
        assert_eq!(fe.available_licenses_per_core, 2.0);
        assert_eq!(fe.hosts[0].covered_licenses_count, 3.0);
    }

    #[tokio::test]
    async fn test_unknown_license_type_is_rejected() {
        let service = seeded();
        let err = service
            .add_oracle_database_agreement(OracleDatabaseAgreement {
                license_type_id: "PID999".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::LicenseTypeIdNotFound);
    }

    #[tokio::test]
    async fn test_clustered_hosts_cannot_be_associated() {
        let service = seeded();
        let id = service.seed_agreement(OracleDatabaseAgreement {
            license_type_id: "PID001".to_string(),
            ..Default::default()
        });
        let err = service
            .add_host_to_oracle_database_agreement(id, "clustered")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotInClusterHostNotFound);

        service.add_host_to_oracle_database_agreement(id, "foobar").await.unwrap();
        let err = service
            .add_host_to_oracle_database_agreement(ObjectId::generate(), "foobar")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AgreementNotFound);
    }

    #[tokio::test]
    async fn test_filter_by_flags() {
        let service = seeded();
        service.seed_agreement(OracleDatabaseAgreement {
            license_type_id: "PID001".to_string(),
            unlimited: true,
            catch_all: true,
            ..Default::default()
        });
        service.seed_agreement(OracleDatabaseAgreement {
            license_type_id: "PID001".to_string(),
            ..Default::default()
        });
        let filter = OracleDatabaseAgreementsFilter {
            unlimited: Some(true),
            ..Default::default()
        };
        let found = service.get_oracle_database_agreements(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].catch_all);
    }

    #[tokio::test]
    async fn test_mysql_agreement_crud() {
        let service = LocalService::new();
        let saved = service
            .add_mysql_agreement(MySqlAgreement {
                agreement_type: MySqlAgreement::TYPE_SERVER.to_string(),
                csi: "1234".to_string(),
                number_of_licenses: 2,
                hosts: vec!["foobar".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(!saved.id.is_nil());

        let updated = service
            .update_mysql_agreement(MySqlAgreement {
                number_of_licenses: 5,
                ..saved.clone()
            })
            .await
            .unwrap();
        assert_eq!(service.get_mysql_agreements().await.unwrap(), vec![updated]);

        service.delete_mysql_agreement(saved.id).await.unwrap();
        let err = service.delete_mysql_agreement(saved.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        let err = service.update_mysql_agreement(saved).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}

use async_trait::async_trait;

use super::{not_found, LocalService};
use crate::model::{OracleDatabaseLicenseType, SqlServerDatabaseLicenseType};
use crate::service::error::{ErrorKind, ServiceError, ServiceResult};
use crate::service::LicenseTypeService;

#[async_trait]
impl LicenseTypeService for LocalService {
    async fn get_oracle_database_license_types(&self) -> ServiceResult<Vec<OracleDatabaseLicenseType>> {
        self.record("get_oracle_database_license_types", String::new())?;
        Ok(self.data.read().oracle_license_types.clone())
    }

    async fn add_oracle_database_license_type(
        &self,
        license_type: OracleDatabaseLicenseType,
    ) -> ServiceResult<OracleDatabaseLicenseType> {
        self.record("add_oracle_database_license_type", format!("{:?}", license_type))?;
        let mut data = self.data.write();
        if data.oracle_license_type(&license_type.id).is_some() {
            return Err(ServiceError::new(ErrorKind::Duplicated).with_message(license_type.id));
        }
        data.oracle_license_types.push(license_type.clone());
        Ok(license_type)
    }

    async fn update_oracle_database_license_type(
        &self,
        license_type: OracleDatabaseLicenseType,
    ) -> ServiceResult<OracleDatabaseLicenseType> {
        self.record("update_oracle_database_license_type", format!("{:?}", license_type))?;
        let mut data = self.data.write();
        let stored = data
            .oracle_license_types
            .iter_mut()
            .find(|lt| lt.id == license_type.id)
            .ok_or_else(|| not_found(ErrorKind::LicenseTypeIdNotFound, &license_type.id))?;
        *stored = license_type.clone();
        Ok(license_type)
    }

    async fn delete_oracle_database_license_type(&self, id: &str) -> ServiceResult<()> {
        self.record("delete_oracle_database_license_type", format!("{:?}", id))?;
        let mut data = self.data.write();
        let before = data.oracle_license_types.len();
        data.oracle_license_types.retain(|lt| lt.id != id);
        if data.oracle_license_types.len() == before {
            return Err(not_found(ErrorKind::LicenseTypeIdNotFound, id));
        }
        Ok(())
    }

    async fn get_sql_server_database_license_types(&self) -> ServiceResult<Vec<SqlServerDatabaseLicenseType>> {
        self.record("get_sql_server_database_license_types", String::new())?;
        Ok(self.data.read().sql_server_license_types.clone())
    }
}

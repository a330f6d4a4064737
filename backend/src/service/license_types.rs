use async_trait::async_trait;

use super::error::ServiceResult;
use crate::model::{OracleDatabaseLicenseType, SqlServerDatabaseLicenseType};

/// Service trait for the license catalogs.
#[async_trait]
pub trait LicenseTypeService: Send + Sync {
    async fn get_oracle_database_license_types(&self) -> ServiceResult<Vec<OracleDatabaseLicenseType>>;

    async fn add_oracle_database_license_type(
        &self,
        license_type: OracleDatabaseLicenseType,
    ) -> ServiceResult<OracleDatabaseLicenseType>;

    async fn update_oracle_database_license_type(
        &self,
        license_type: OracleDatabaseLicenseType,
    ) -> ServiceResult<OracleDatabaseLicenseType>;

    async fn delete_oracle_database_license_type(&self, id: &str) -> ServiceResult<()>;

    async fn get_sql_server_database_license_types(&self) -> ServiceResult<Vec<SqlServerDatabaseLicenseType>>;
}

use async_trait::async_trait;

use super::error::ServiceResult;
use crate::model::{
    MySqlAgreement, ObjectId, OracleDatabaseAgreement, OracleDatabaseAgreementFe, OracleDatabaseAgreementPart,
    OracleDatabaseAgreementsFilter,
};

/// Service trait for Oracle/Database and MySQL agreements.
#[async_trait]
pub trait AgreementService: Send + Sync {
    async fn add_oracle_database_agreement(
        &self,
        agreement: OracleDatabaseAgreement,
    ) -> ServiceResult<OracleDatabaseAgreementFe>;

    async fn update_oracle_database_agreement(
        &self,
        agreement: OracleDatabaseAgreement,
    ) -> ServiceResult<OracleDatabaseAgreementFe>;

    async fn get_oracle_database_agreements(
        &self,
        filter: &OracleDatabaseAgreementsFilter,
    ) -> ServiceResult<Vec<OracleDatabaseAgreementFe>>;

    async fn delete_oracle_database_agreement(&self, id: ObjectId) -> ServiceResult<()>;

    async fn add_host_to_oracle_database_agreement(&self, id: ObjectId, hostname: &str) -> ServiceResult<()>;

    async fn delete_host_from_oracle_database_agreement(&self, id: ObjectId, hostname: &str) -> ServiceResult<()>;

    async fn get_oracle_database_agreement_parts(&self) -> ServiceResult<Vec<OracleDatabaseAgreementPart>>;

    // ==================== MySQL ====================

    async fn add_mysql_agreement(&self, agreement: MySqlAgreement) -> ServiceResult<MySqlAgreement>;

    async fn update_mysql_agreement(&self, agreement: MySqlAgreement) -> ServiceResult<MySqlAgreement>;

    async fn get_mysql_agreements(&self) -> ServiceResult<Vec<MySqlAgreement>>;

    async fn delete_mysql_agreement(&self, id: ObjectId) -> ServiceResult<()>;
}

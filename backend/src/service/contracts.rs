//! License contracts and their CSV import.

use async_trait::async_trait;

use super::error::ServiceResult;
use crate::model::{
    ContractImport, MySqlContract, ObjectId, OracleDatabaseContract, OracleDatabaseContractFe,
    OracleDatabaseContractsFilter, SqlServerDatabaseContract,
};

/// Service trait for Oracle, SQL Server and MySQL contracts.
#[async_trait]
pub trait ContractService: Send + Sync {
    // ==================== Oracle/Database ====================

    async fn add_oracle_database_contract(
        &self,
        contract: OracleDatabaseContract,
    ) -> ServiceResult<OracleDatabaseContractFe>;

    async fn update_oracle_database_contract(
        &self,
        contract: OracleDatabaseContract,
    ) -> ServiceResult<OracleDatabaseContractFe>;

    async fn get_oracle_database_contracts(
        &self,
        filter: &OracleDatabaseContractsFilter,
    ) -> ServiceResult<Vec<OracleDatabaseContractFe>>;

    async fn get_oracle_database_contracts_as_xlsx(
        &self,
        filter: &OracleDatabaseContractsFilter,
    ) -> ServiceResult<Vec<u8>>;

    async fn delete_oracle_database_contract(&self, id: ObjectId) -> ServiceResult<()>;

    async fn add_host_to_oracle_database_contract(&self, id: ObjectId, hostname: &str) -> ServiceResult<()>;

    async fn delete_host_from_oracle_database_contract(&self, id: ObjectId, hostname: &str) -> ServiceResult<()>;

    // ==================== Microsoft/SQL Server ====================

    async fn add_sql_server_database_contract(
        &self,
        contract: SqlServerDatabaseContract,
    ) -> ServiceResult<SqlServerDatabaseContract>;

    async fn update_sql_server_database_contract(
        &self,
        contract: SqlServerDatabaseContract,
    ) -> ServiceResult<SqlServerDatabaseContract>;

    async fn get_sql_server_database_contracts(&self) -> ServiceResult<Vec<SqlServerDatabaseContract>>;

    async fn get_sql_server_database_contracts_as_xlsx(&self) -> ServiceResult<Vec<u8>>;

    async fn delete_sql_server_database_contract(&self, id: ObjectId) -> ServiceResult<()>;

    // ==================== MySQL ====================

    async fn add_mysql_contract(&self, contract: MySqlContract) -> ServiceResult<MySqlContract>;

    async fn update_mysql_contract(&self, contract: MySqlContract) -> ServiceResult<MySqlContract>;

    /// Contracts whose location is in `locations`.
    async fn get_mysql_contracts(&self, locations: &[String]) -> ServiceResult<Vec<MySqlContract>>;

    async fn get_mysql_contracts_as_xlsx(&self, locations: &[String]) -> ServiceResult<Vec<u8>>;

    async fn delete_mysql_contract(&self, id: ObjectId) -> ServiceResult<()>;

    // ==================== Import ====================

    /// Store every imported contract. Returns how many were stored.
    async fn import_contracts(&self, contracts: ContractImport) -> ServiceResult<usize>;
}

use async_trait::async_trait;

use super::{not_found, records_workbook, to_rows, LocalData, LocalService};
use crate::model::filter::{flag_matches, text_matches};
use crate::model::{
    ContractImport, MySqlContract, ObjectId, OracleDatabaseContract, OracleDatabaseContractFe,
    OracleDatabaseContractsFilter, SqlServerDatabaseContract,
};
use crate::service::error::{ErrorKind, ServiceError, ServiceResult};
use crate::service::ContractService;

impl LocalData {
    fn contract_fe(&self, contract: &OracleDatabaseContract) -> OracleDatabaseContractFe {
        let info = self.license_type_info(&contract.license_type_id);
        let (hosts, available) = self.coverage(
            &contract.license_type_id,
            contract.count,
            contract.unlimited,
            &contract.hosts,
        );
        let count = contract.count as f64;
        let (per_core, per_user, available_core, available_user) = if info.named_user {
            (0.0, count, 0.0, available)
        } else {
            (count, 0.0, available, 0.0)
        };
        OracleDatabaseContractFe {
            id: contract.id,
            contract_id: contract.contract_id.clone(),
            csi: contract.csi.clone(),
            license_type_id: contract.license_type_id.clone(),
            item_description: info.item_description,
            metric: info.metric,
            reference_number: contract.reference_number.clone(),
            unlimited: contract.unlimited,
            basket: contract.basket,
            restricted: contract.restricted,
            hosts,
            licenses_per_core: per_core,
            licenses_per_user: per_user,
            available_licenses_per_core: available_core,
            available_licenses_per_user: available_user,
        }
    }

    fn oracle_contract_mut(&mut self, id: ObjectId) -> ServiceResult<&mut OracleDatabaseContract> {
        self.oracle_contracts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found(ErrorKind::ContractNotFound, id))
    }

    fn require_oracle_license_type(&self, id: &str) -> ServiceResult<()> {
        if self.oracle_license_type(id).is_none() {
            return Err(not_found(ErrorKind::LicenseTypeIdNotFound, id));
        }
        Ok(())
    }

    fn require_sql_server_license_type(&self, id: &str) -> ServiceResult<()> {
        if !self.sql_server_license_types.iter().any(|lt| lt.id == id) {
            return Err(not_found(ErrorKind::LicenseTypeIdNotFound, id));
        }
        Ok(())
    }

    fn oracle_contracts_fe(&self, filter: &OracleDatabaseContractsFilter) -> Vec<OracleDatabaseContractFe> {
        self.oracle_contracts
            .iter()
            .map(|c| self.contract_fe(c))
            .filter(|c| contract_matches(filter, c))
            .collect()
    }

    fn mysql_contracts_in(&self, locations: &[String]) -> Vec<MySqlContract> {
        self.mysql_contracts
            .iter()
            .filter(|c| locations.contains(&c.location))
            .cloned()
            .collect()
    }
}

fn contract_matches(filter: &OracleDatabaseContractsFilter, contract: &OracleDatabaseContractFe) -> bool {
    text_matches(&filter.contract_id, &contract.contract_id)
        && text_matches(&filter.license_type_id, &contract.license_type_id)
        && text_matches(&filter.item_description, &contract.item_description)
        && text_matches(&filter.csi, &contract.csi)
        && text_matches(&filter.metric, &contract.metric)
        && text_matches(&filter.reference_number, &contract.reference_number)
        && flag_matches(filter.unlimited, contract.unlimited)
        && flag_matches(filter.basket, contract.basket)
        && filter.licenses_per_core.contains(contract.licenses_per_core)
        && filter.licenses_per_user.contains(contract.licenses_per_user)
        && filter
            .available_licenses_per_core
            .contains(contract.available_licenses_per_core)
        && filter
            .available_licenses_per_user
            .contains(contract.available_licenses_per_user)
}

#[async_trait]
impl ContractService for LocalService {
    // ==================== Oracle/Database ====================

    async fn add_oracle_database_contract(
        &self,
        mut contract: OracleDatabaseContract,
    ) -> ServiceResult<OracleDatabaseContractFe> {
        self.record("add_oracle_database_contract", format!("{:?}", contract))?;
        let mut data = self.data.write();
        data.require_oracle_license_type(&contract.license_type_id)?;
        contract.id = ObjectId::generate();
        let fe = data.contract_fe(&contract);
        data.oracle_contracts.push(contract);
        Ok(fe)
    }

    async fn update_oracle_database_contract(
        &self,
        contract: OracleDatabaseContract,
    ) -> ServiceResult<OracleDatabaseContractFe> {
        self.record("update_oracle_database_contract", format!("{:?}", contract))?;
        let mut data = self.data.write();
        data.require_oracle_license_type(&contract.license_type_id)?;
        *data.oracle_contract_mut(contract.id)? = contract.clone();
        Ok(data.contract_fe(&contract))
    }

    async fn get_oracle_database_contracts(
        &self,
        filter: &OracleDatabaseContractsFilter,
    ) -> ServiceResult<Vec<OracleDatabaseContractFe>> {
        self.record("get_oracle_database_contracts", format!("{:?}", filter))?;
        Ok(self.data.read().oracle_contracts_fe(filter))
    }

    async fn get_oracle_database_contracts_as_xlsx(
        &self,
        filter: &OracleDatabaseContractsFilter,
    ) -> ServiceResult<Vec<u8>> {
        self.record("get_oracle_database_contracts_as_xlsx", format!("{:?}", filter))?;
        let contracts = self.data.read().oracle_contracts_fe(filter);
        records_workbook(
            "Contracts",
            &[
                "Contract Number", "Part Number", "Description", "Metric", "CSI", "Reference Number",
                "Unlimited", "Basket", "Restricted", "Licenses Per Core", "Licenses Per User",
                "Available Licenses Per Core", "Available Licenses Per User",
            ],
            &[
                "contractID", "licenseTypeID", "itemDescription", "metric", "csi", "referenceNumber",
                "unlimited", "basket", "restricted", "licensesPerCore", "licensesPerUser",
                "availableLicensesPerCore", "availableLicensesPerUser",
            ],
            &to_rows(&contracts)?,
        )
    }

    async fn delete_oracle_database_contract(&self, id: ObjectId) -> ServiceResult<()> {
        self.record("delete_oracle_database_contract", format!("{:?}", id))?;
        let mut data = self.data.write();
        let before = data.oracle_contracts.len();
        data.oracle_contracts.retain(|c| c.id != id);
        if data.oracle_contracts.len() == before {
            return Err(not_found(ErrorKind::ContractNotFound, id));
        }
        Ok(())
    }

    async fn add_host_to_oracle_database_contract(&self, id: ObjectId, hostname: &str) -> ServiceResult<()> {
        self.record(
            "add_host_to_oracle_database_contract",
            format!("{:?}, {:?}", id, hostname),
        )?;
        let mut data = self.data.write();
        if !data.host_outside_cluster(hostname) {
            return Err(not_found(ErrorKind::NotInClusterHostNotFound, hostname));
        }
        let contract = data.oracle_contract_mut(id)?;
        if !contract.hosts.iter().any(|h| h == hostname) {
            contract.hosts.push(hostname.to_string());
        }
        Ok(())
    }

    async fn delete_host_from_oracle_database_contract(&self, id: ObjectId, hostname: &str) -> ServiceResult<()> {
        self.record(
            "delete_host_from_oracle_database_contract",
            format!("{:?}, {:?}", id, hostname),
        )?;
        let mut data = self.data.write();
        let contract = data.oracle_contract_mut(id)?;
        let before = contract.hosts.len();
        contract.hosts.retain(|h| h != hostname);
        if contract.hosts.len() == before {
            return Err(not_found(ErrorKind::NotFound, hostname));
        }
        Ok(())
    }

    // ==================== Microsoft/SQL Server ====================

    async fn add_sql_server_database_contract(
        &self,
        mut contract: SqlServerDatabaseContract,
    ) -> ServiceResult<SqlServerDatabaseContract> {
        self.record("add_sql_server_database_contract", format!("{:?}", contract))?;
        let mut data = self.data.write();
        data.require_sql_server_license_type(&contract.license_type_id)?;
        contract.id = ObjectId::generate();
        data.sql_server_contracts.push(contract.clone());
        Ok(contract)
    }

    async fn update_sql_server_database_contract(
        &self,
        contract: SqlServerDatabaseContract,
    ) -> ServiceResult<SqlServerDatabaseContract> {
        self.record("update_sql_server_database_contract", format!("{:?}", contract))?;
        let mut data = self.data.write();
        data.require_sql_server_license_type(&contract.license_type_id)?;
        let stored = data
            .sql_server_contracts
            .iter_mut()
            .find(|c| c.id == contract.id)
            .ok_or_else(|| not_found(ErrorKind::ContractNotFound, contract.id))?;
        *stored = contract.clone();
        Ok(contract)
    }

    async fn get_sql_server_database_contracts(&self) -> ServiceResult<Vec<SqlServerDatabaseContract>> {
        self.record("get_sql_server_database_contracts", String::new())?;
        Ok(self.data.read().sql_server_contracts.clone())
    }

    async fn get_sql_server_database_contracts_as_xlsx(&self) -> ServiceResult<Vec<u8>> {
        self.record("get_sql_server_database_contracts_as_xlsx", String::new())?;
        let contracts = self.data.read().sql_server_contracts.clone();
        records_workbook(
            "Contracts",
            &["Contract Number", "Type", "License Type", "Licenses Number", "Hosts", "Clusters"],
            &["contractID", "type", "licenseTypeID", "licensesNumber", "hosts", "clusters"],
            &to_rows(&contracts)?,
        )
    }

    async fn delete_sql_server_database_contract(&self, id: ObjectId) -> ServiceResult<()> {
        self.record("delete_sql_server_database_contract", format!("{:?}", id))?;
        let mut data = self.data.write();
        let before = data.sql_server_contracts.len();
        data.sql_server_contracts.retain(|c| c.id != id);
        if data.sql_server_contracts.len() == before {
            return Err(not_found(ErrorKind::ContractNotFound, id));
        }
        Ok(())
    }

    // ==================== MySQL ====================

    async fn add_mysql_contract(&self, mut contract: MySqlContract) -> ServiceResult<MySqlContract> {
        self.record("add_mysql_contract", format!("{:?}", contract))?;
        contract.id = ObjectId::generate();
        self.data.write().mysql_contracts.push(contract.clone());
        Ok(contract)
    }

    async fn update_mysql_contract(&self, contract: MySqlContract) -> ServiceResult<MySqlContract> {
        self.record("update_mysql_contract", format!("{:?}", contract))?;
        let mut data = self.data.write();
        let stored = data
            .mysql_contracts
            .iter_mut()
            .find(|c| c.id == contract.id)
            .ok_or_else(|| not_found(ErrorKind::NotFound, contract.id))?;
        *stored = contract.clone();
        Ok(contract)
    }

    async fn get_mysql_contracts(&self, locations: &[String]) -> ServiceResult<Vec<MySqlContract>> {
        self.record("get_mysql_contracts", format!("{:?}", locations))?;
        Ok(self.data.read().mysql_contracts_in(locations))
    }

    async fn get_mysql_contracts_as_xlsx(&self, locations: &[String]) -> ServiceResult<Vec<u8>> {
        self.record("get_mysql_contracts_as_xlsx", format!("{:?}", locations))?;
        let contracts = self.data.read().mysql_contracts_in(locations);
        records_workbook(
            "Contracts",
            &["Type", "Contract Number", "CSI", "Number Of Licenses", "Clusters", "Hosts", "Location"],
            &["type", "contractID", "csi", "numberOfLicenses", "clusters", "hosts", "location"],
            &to_rows(&contracts)?,
        )
    }

    async fn delete_mysql_contract(&self, id: ObjectId) -> ServiceResult<()> {
        self.record("delete_mysql_contract", format!("{:?}", id))?;
        let mut data = self.data.write();
        let before = data.mysql_contracts.len();
        data.mysql_contracts.retain(|c| c.id != id);
        if data.mysql_contracts.len() == before {
            return Err(not_found(ErrorKind::NotFound, id));
        }
        Ok(())
    }

    // ==================== Import ====================

    async fn import_contracts(&self, contracts: ContractImport) -> ServiceResult<usize> {
        self.record("import_contracts", format!("{:?}", contracts))?;
        let mut data = self.data.write();
        let imported = contracts.len();
        match contracts {
            ContractImport::Oracle(contracts) => {
                for contract in &contracts {
                    contract
                        .check()
                        .map_err(|e| ServiceError::validation(e.to_string()))?;
                    data.require_oracle_license_type(&contract.license_type_id)?;
                }
                data.oracle_contracts.extend(contracts.into_iter().map(|mut c| {
                    c.id = ObjectId::generate();
                    c
                }));
            }
            ContractImport::SqlServer(contracts) => {
                for contract in &contracts {
                    data.require_sql_server_license_type(&contract.license_type_id)?;
                }
                data.sql_server_contracts.extend(contracts.into_iter().map(|mut c| {
                    c.id = ObjectId::generate();
                    c
                }));
            }
            ContractImport::MySql(contracts) => {
                if let Some(invalid) = contracts.iter().find(|c| !c.is_valid()) {
                    return Err(ServiceError::validation(format!(
                        "Invalid contract type: {}",
                        invalid.contract_type
                    )));
                }
                data.mysql_contracts.extend(contracts.into_iter().map(|mut c| {
                    c.id = ObjectId::generate();
                    c
                }));
            }
        }
        Ok(imported)
    }
}

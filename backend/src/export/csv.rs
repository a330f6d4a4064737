//! Contract CSV samples and imports.
//!
//! List-valued columns (`hosts`, `clusters`) hold names separated by `;`.

use serde::{Deserialize, Serialize};

use super::ExportError;
use crate::model::{
    ContractImport, DatabaseType, MySqlContract, ObjectId, OracleDatabaseContract,
    SqlServerDatabaseContract,
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OracleContractRow {
    #[serde(rename = "contractID")]
    contract_id: String,
    csi: String,
    #[serde(rename = "licenseTypeID")]
    license_type_id: String,
    reference_number: String,
    unlimited: bool,
    count: i64,
    basket: bool,
    restricted: bool,
    hosts: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SqlServerContractRow {
    #[serde(rename = "contractID")]
    contract_id: String,
    #[serde(rename = "type")]
    contract_type: String,
    #[serde(rename = "licenseTypeID")]
    license_type_id: String,
    licenses_number: i64,
    hosts: String,
    clusters: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MySqlContractRow {
    #[serde(rename = "contractID")]
    contract_id: String,
    #[serde(rename = "type")]
    contract_type: String,
    csi: String,
    number_of_licenses: u32,
    location: String,
    hosts: String,
    clusters: String,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// CSV file with the header row and one example row for `database_type`.
pub fn contracts_sample(database_type: DatabaseType) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    match database_type {
        DatabaseType::Oracle => writer.serialize(OracleContractRow {
            contract_id: "AID001".to_string(),
            csi: "CSI001".to_string(),
            license_type_id: "A90611".to_string(),
            reference_number: "R001".to_string(),
            unlimited: false,
            count: 10,
            basket: true,
            restricted: false,
            hosts: "host01;host02".to_string(),
        })?,
        DatabaseType::SqlServer => writer.serialize(SqlServerContractRow {
            contract_id: "CID001".to_string(),
            contract_type: "host".to_string(),
            license_type_id: "359-06320".to_string(),
            licenses_number: 4,
            hosts: "host01".to_string(),
            clusters: String::new(),
        })?,
        DatabaseType::MySql => writer.serialize(MySqlContractRow {
            contract_id: "MID001".to_string(),
            contract_type: "cluster".to_string(),
            csi: "CSI001".to_string(),
            number_of_licenses: 2,
            location: "Italy".to_string(),
            hosts: String::new(),
            clusters: "cluster01".to_string(),
        })?,
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}

/// Decode an uploaded contract CSV. Every row becomes a new contract.
pub fn parse_contracts(database_type: DatabaseType, data: &[u8]) -> Result<ContractImport, ExportError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(data);
    let import = match database_type {
        DatabaseType::Oracle => ContractImport::Oracle(
            reader
                .deserialize::<OracleContractRow>()
                .map(|row| {
                    row.map(|r| OracleDatabaseContract {
                        id: ObjectId::NIL,
                        contract_id: r.contract_id,
                        csi: r.csi,
                        license_type_id: r.license_type_id,
                        reference_number: r.reference_number,
                        unlimited: r.unlimited,
                        count: r.count,
                        basket: r.basket,
                        restricted: r.restricted,
                        hosts: split_list(&r.hosts),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        ),
        DatabaseType::SqlServer => ContractImport::SqlServer(
            reader
                .deserialize::<SqlServerContractRow>()
                .map(|row| {
                    row.map(|r| SqlServerDatabaseContract {
                        id: ObjectId::NIL,
                        contract_id: r.contract_id,
                        contract_type: r.contract_type,
                        license_type_id: r.license_type_id,
                        licenses_number: r.licenses_number,
                        hosts: split_list(&r.hosts),
                        clusters: split_list(&r.clusters),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        ),
        DatabaseType::MySql => ContractImport::MySql(
            reader
                .deserialize::<MySqlContractRow>()
                .map(|row| {
                    row.map(|r| MySqlContract {
                        id: ObjectId::NIL,
                        contract_type: r.contract_type,
                        contract_id: r.contract_id,
                        csi: r.csi,
                        number_of_licenses: r.number_of_licenses,
                        clusters: split_list(&r.clusters),
                        hosts: split_list(&r.hosts),
                        location: r.location,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        ),
    };
    Ok(import)
}

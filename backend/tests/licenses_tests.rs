mod support;

use axum::http::StatusCode;
use serde_json::json;

use ercole_api::export::XLSX_CONTENT_TYPE;
use ercole_api::model::{
    DatabaseLicense, Host, MySqlContract, ObjectId, OracleDatabase, OracleDatabaseContract,
    OracleDatabaseLicenseType, SqlServerDatabaseLicenseType,
};
use support::{read_xlsx, TestApp};

fn licensed_app() -> TestApp {
    let app = TestApp::new();
    app.service.seed_oracle_license_type(OracleDatabaseLicenseType {
        id: "A90611".to_string(),
        item_description: "Oracle Database Enterprise Edition".to_string(),
        metric: "Processor Perpetual".to_string(),
        ..Default::default()
    });
    app.service.seed_sql_server_license_type(SqlServerDatabaseLicenseType {
        id: "359-06320".to_string(),
        item_description: "SQL Server Enterprise Edition".to_string(),
        ..Default::default()
    });
    app.service.seed_host(Host {
        hostname: "foobar".to_string(),
        location: "Italy".to_string(),
        oracle_databases: vec![OracleDatabase {
            name: "ERCOLE".to_string(),
            licenses: vec![DatabaseLicense {
                license_type_id: "A90611".to_string(),
                count: 3.0,
                ignored: false,
            }],
            ..Default::default()
        }],
        ..Default::default()
    });
    app
}

// =============================================================================
// Agreements
// =============================================================================

#[tokio::test]
async fn test_add_agreement_computes_coverage() {
    let app = licensed_app();
    let response = app
        .post_json(
            "/agreements/oracle/database",
            json!({
                "agreementID": "AID001",
                "licenseTypeID": "A90611",
                "count": 10,
                "catchAll": true,
                "hosts": ["foobar"],
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let saved = response.json();
    assert_eq!(saved["itemDescription"], "Oracle Database Enterprise Edition");
    assert_eq!(saved["hosts"][0]["hostname"], "foobar");
    assert_eq!(saved["hosts"][0]["consumedLicensesCount"], 3.0);
    assert_eq!(saved["availableLicensesPerCore"], 7.0);
}

#[tokio::test]
async fn test_add_agreement_requires_nil_id() {
    let app = licensed_app();
    let response = app
        .post_json(
            "/agreements/oracle/database",
            json!({ "id": ObjectId::generate().to_hex(), "agreementID": "AID001", "catchAll": true }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.error(),
        "ID must be empty to add a new AssociatedLicenseType"
    );
    assert_eq!(app.service.total_calls(), 0);
}

#[tokio::test]
async fn test_add_agreement_checks_flags() {
    let app = licensed_app();

    let response = app
        .post_json(
            "/agreements/oracle/database",
            json!({ "licenseTypeID": "A90611", "unlimited": true, "catchAll": false }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .post_json(
            "/agreements/oracle/database",
            json!({ "licenseTypeID": "A90611", "restricted": true, "catchAll": true }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.service.total_calls(), 0);
}

#[tokio::test]
async fn test_add_agreement_with_unknown_license_type() {
    let app = licensed_app();
    let response = app
        .post_json(
            "/agreements/oracle/database",
            json!({ "licenseTypeID": "XXXXXX", "catchAll": true }),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_agreement_decoding_is_strict() {
    let app = licensed_app();
    let response = app
        .post_json("/agreements/oracle/database", json!({ "Pippo": true }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "json: unknown field \"Pippo\"");
}

#[tokio::test]
async fn test_get_agreements_filters_and_validates() {
    let app = licensed_app();
    app.post_json(
        "/agreements/oracle/database",
        json!({ "agreementID": "AID001", "licenseTypeID": "A90611", "catchAll": true }),
    )
    .await;
    app.post_json(
        "/agreements/oracle/database",
        json!({ "agreementID": "AID002", "licenseTypeID": "A90611", "restricted": true }),
    )
    .await;

    let response = app.get("/agreements/oracle/database?catch-all=true").await;
    assert_eq!(response.status, StatusCode::OK);
    let agreements = response.json()["agreements"].as_array().unwrap().clone();
    assert_eq!(agreements.len(), 1);
    assert_eq!(agreements[0]["agreementID"], "AID001");

    let response = app.get("/agreements/oracle/database?catch-all=NULL").await;
    assert_eq!(response.json()["agreements"].as_array().unwrap().len(), 2);

    app.service.clear_calls();
    let response = app.get("/agreements/oracle/database?unlimited=sasasd").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.error(), "Invalid value for unlimited");
    assert_eq!(app.service.total_calls(), 0);
}

#[tokio::test]
async fn test_agreement_hosts() {
    let app = licensed_app();
    let id = app
        .post_json(
            "/agreements/oracle/database",
            json!({ "licenseTypeID": "A90611", "catchAll": true }),
        )
        .await
        .json()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let uri = format!("/agreements/oracle/database/{}/hosts", id);
    let response = app.post_text(&uri, "foobar").await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.post_text(&uri, "nowhere").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.delete(&format!("{}/foobar", uri)).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .post_text(&format!("/agreements/oracle/database/{}/hosts", ObjectId::generate().to_hex()), "foobar")
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.post_text("/agreements/oracle/database/not-an-id/hosts", "foobar").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_delete_agreement() {
    let app = licensed_app();
    let id = app
        .post_json(
            "/agreements/oracle/database",
            json!({ "licenseTypeID": "A90611", "catchAll": true }),
        )
        .await
        .json()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app.delete(&format!("/agreements/oracle/database/{}", id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), serde_json::Value::Null);

    let response = app.delete(&format!("/agreements/oracle/database/{}", id)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Contracts
// =============================================================================

#[tokio::test]
async fn test_oracle_contract_lifecycle() {
    let app = licensed_app();
    let response = app
        .post_json(
            "/contracts/oracle/database",
            json!({
                "contractID": "CID001",
                "licenseTypeID": "A90611",
                "count": 2,
                "basket": true,
                "hosts": ["foobar"],
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let saved = response.json();
    assert_eq!(saved["hosts"][0]["coveredLicensesCount"], 2.0);
    assert_eq!(saved["availableLicensesPerCore"], 0.0);

    let mut update = json!({
        "id": saved["id"],
        "contractID": "CID001",
        "licenseTypeID": "A90611",
        "count": 5,
        "basket": true,
        "hosts": ["foobar"],
    });
    let response = app.put_json("/contracts/oracle/database", update.clone()).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["availableLicensesPerCore"], 2.0);

    update["id"] = json!(ObjectId::generate().to_hex());
    let response = app.put_json("/contracts/oracle/database", update).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let contracts = app.get("/contracts/oracle/database").await.json();
    assert_eq!(contracts["contracts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_oracle_contract_checks_basket_rules() {
    let app = licensed_app();

    let response = app
        .post_json(
            "/contracts/oracle/database",
            json!({ "licenseTypeID": "A90611", "unlimited": true }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Contract is unlimited so it must be even Basket");

    let response = app
        .post_json(
            "/contracts/oracle/database",
            json!({ "licenseTypeID": "A90611", "restricted": true, "basket": true }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.service.total_calls(), 0);
}

#[tokio::test]
async fn test_oracle_contracts_export_uses_same_filter() {
    let app = licensed_app();
    app.service.seed_oracle_contract(OracleDatabaseContract {
        contract_id: "CID001".to_string(),
        license_type_id: "A90611".to_string(),
        count: 4,
        basket: true,
        ..Default::default()
    });
    app.service.seed_oracle_contract(OracleDatabaseContract {
        contract_id: "CID002".to_string(),
        license_type_id: "A90611".to_string(),
        count: 4,
        restricted: true,
        ..Default::default()
    });

    let json = app.get("/contracts/oracle/database?basket=true").await;
    assert_eq!(json.json()["contracts"].as_array().unwrap().len(), 1);
    let json_args = app.service.last_call().unwrap().args;

    let xlsx = app.get_xlsx("/contracts/oracle/database?basket=true").await;
    assert_eq!(xlsx.status, StatusCode::OK);
    assert_eq!(xlsx.content_type(), XLSX_CONTENT_TYPE);
    let call = app.service.last_call().unwrap();
    assert_eq!(call.method, "get_oracle_database_contracts_as_xlsx");
    assert_eq!(call.args, json_args);

    let rows = read_xlsx(&xlsx.body);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "Contract Number");
    assert_eq!(rows[1][0], "CID001");
}

#[tokio::test]
async fn test_sql_server_contracts() {
    let app = licensed_app();

    let response = app
        .post_json(
            "/contracts/microsoft/database",
            json!({ "id": ObjectId::generate().to_hex(), "licenseTypeID": "359-06320" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .post_json(
            "/contracts/microsoft/database",
            json!({ "contractID": "SID001", "type": "host", "licenseTypeID": "359-06320", "licensesNumber": 4 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let id = response.json()["id"].as_str().unwrap().to_string();

    let response = app
        .post_json(
            "/contracts/microsoft/database",
            json!({ "licenseTypeID": "unknown" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let contracts = app.get("/contracts/microsoft/database").await.json();
    assert_eq!(contracts["contracts"][0]["contractID"], "SID001");

    let response = app.delete(&format!("/contracts/microsoft/database/{}", id)).await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app.delete(&format!("/contracts/microsoft/database/{}", id)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mysql_contracts() {
    let app = licensed_app();

    let response = app
        .post_json(
            "/contracts/mysql/database",
            json!({ "type": "server", "contractID": "MID001", "location": "Italy" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Contract isn't valid");

    let response = app
        .post_json(
            "/contracts/mysql/database",
            json!({ "type": "host", "contractID": "MID001", "location": "Italy", "hosts": ["foobar"] }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let mut contract = response.json();
    let id = contract["id"].as_str().unwrap().to_string();

    contract["numberOfLicenses"] = json!(8);
    let response = app
        .put_json(&format!("/contracts/mysql/database/{}", ObjectId::generate().to_hex()), contract.clone())
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Object ID does not correspond");

    let response = app.put_json(&format!("/contracts/mysql/database/{}", id), contract).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["numberOfLicenses"], 8);

    let contracts = app.get("/contracts/mysql/database").await.json();
    assert_eq!(contracts["contracts"].as_array().unwrap().len(), 1);

    let response = app.delete(&format!("/contracts/mysql/database/{}", id)).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let response = app.delete(&format!("/contracts/mysql/database/{}", id)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mysql_contracts_scoped_to_user_locations() {
    let app = licensed_app();
    app.service.seed_mysql_contract(MySqlContract {
        contract_type: MySqlContract::TYPE_HOST.to_string(),
        contract_id: "MID001".to_string(),
        location: "Italy".to_string(),
        ..Default::default()
    });

    let response = app
        .send_as(
            &app.user_token,
            axum::http::Method::GET,
            "/contracts/mysql/database",
            axum::body::Body::empty(),
        )
        .await;

    // The plain user has no role, hence no location.
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["contracts"], json!([]));
}

#[tokio::test]
async fn test_mysql_agreements() {
    let app = licensed_app();

    let response = app
        .post_json(
            "/agreements/mysql/database",
            json!({ "type": "host", "csi": "1234", "numberOfLicenses": 2 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Agreement isn't valid");

    let response = app
        .post_json(
            "/agreements/mysql/database",
            json!({ "id": ObjectId::generate().to_hex(), "type": "server" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "ID must be empty");

    let response = app
        .post_json(
            "/agreements/mysql/database",
            json!({ "type": "cluster", "csi": "1234", "numberOfLicenses": 2, "clusters": ["Puzzait"] }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let mut agreement = response.json();
    let id = agreement["id"].as_str().unwrap().to_string();

    agreement["numberOfLicenses"] = json!(6);
    let response = app
        .put_json(&format!("/agreements/mysql/database/{}", ObjectId::generate().to_hex()), agreement.clone())
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Object ID does not correspond");

    let response = app.put_json("/agreements/mysql/database/not-an-id", agreement.clone()).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = app.put_json(&format!("/agreements/mysql/database/{}", id), agreement).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["numberOfLicenses"], 6);

    let agreements = app.get("/agreements/mysql/database").await.json();
    assert_eq!(agreements["agreements"].as_array().unwrap().len(), 1);
    assert_eq!(agreements["agreements"][0]["clusters"], json!(["Puzzait"]));

    let response = app.delete(&format!("/agreements/mysql/database/{}", id)).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let response = app.delete(&format!("/agreements/mysql/database/{}", id)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.service.call_count("add_mysql_agreement"), 1);
}

#[tokio::test]
async fn test_scenarios() {
    let app = licensed_app();
    app.service.seed_host(Host {
        hostname: "scaled".to_string(),
        location: "Italy".to_string(),
        cpu_cores: 8,
        cluster: Some("Puzzait".to_string()),
        oracle_databases: vec![OracleDatabase {
            name: "SCALED".to_string(),
            licenses: vec![DatabaseLicense {
                license_type_id: "A90611".to_string(),
                count: 4.0,
                ignored: false,
            }],
            ..Default::default()
        }],
        ..Default::default()
    });

    let response = app
        .post_json("/scenarios", json!({ "name": "halve", "hosts": [{ "hostname": "scaled", "core": 4 }] }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let scenario = response.json();
    assert_eq!(scenario["name"], "halve");
    assert_eq!(scenario["hosts"][0]["originalCore"], 8);
    assert_eq!(scenario["hosts"][0]["simulatedCore"], 4);
    let id = scenario["id"].as_str().unwrap().to_string();

    let compliance = app.get(&format!("/scenarios/{}/license-compliance", id)).await.json();
    assert_eq!(compliance["licenses"][0]["actual"]["consumed"], 7.0);
    assert_eq!(compliance["licenses"][0]["got"]["consumed"], 5.0);

    let per_host = app.get(&format!("/scenarios/{}/license-used-host", id)).await.json();
    let scaled = per_host["licenses"]
        .as_array()
        .unwrap()
        .iter()
        .find(|pair| pair["got"]["hostname"] == "scaled")
        .unwrap();
    assert_eq!(scaled["actual"]["usedLicenses"], 4.0);
    assert_eq!(scaled["got"]["usedLicenses"], 2.0);

    let per_database = app.get(&format!("/scenarios/{}/license-used-database", id)).await.json();
    assert_eq!(per_database["licenses"].as_array().unwrap().len(), 2);

    let per_cluster = app.get(&format!("/scenarios/{}/license-used-cluster", id)).await.json();
    assert_eq!(per_cluster["licenses"][0]["got"]["cluster"], "Puzzait");
    assert_eq!(per_cluster["licenses"][0]["got"]["usedLicenses"], 2.0);

    // The inventory itself is unchanged.
    let compliance = app.get("/hosts/technologies/all/databases/licenses-compliance").await.json();
    assert_eq!(compliance["licensesCompliance"][0]["consumed"], 7.0);

    let scenarios = app.get("/scenarios").await.json();
    assert_eq!(scenarios.as_array().unwrap().len(), 1);

    let response = app.delete(&format!("/scenarios/{}", id)).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let response = app.get(&format!("/scenarios/{}", id)).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.message(), id);
}

#[tokio::test]
async fn test_scenario_rejections() {
    let app = licensed_app();

    let response = app
        .post_json("/scenarios", json!({ "name": "x", "hosts": [{ "hostname": "foobar", "cores": 2 }] }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .post_json("/scenarios", json!({ "name": "x", "hosts": [{ "hostname": "nowhere", "core": 2 }] }))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.error(), "Host not found");

    let response = app.get("/scenarios/not-an-id").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.service.call_count("get_scenario"), 0);
    assert_eq!(app.service.call_count("create_scenario"), 1);
}

#[tokio::test]
async fn test_read_only_rejects_license_mutations() {
    let app = TestApp::read_only();

    let response = app
        .post_json("/agreements/oracle/database", json!({ "catchAll": true }))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .post_json("/contracts/mysql/database", json!({ "type": "host" }))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .post_json("/agreements/mysql/database", json!({ "type": "server" }))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.post_json("/scenarios", json!({ "name": "x" })).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .post_json("/settings/oracle/database/license-types", json!({ "id": "A90611" }))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    assert_eq!(app.service.total_calls(), 0);
}

// =============================================================================
// License types
// =============================================================================

#[tokio::test]
async fn test_oracle_license_types() {
    let app = licensed_app();

    let response = app
        .post_json("/settings/oracle/database/license-types", json!({ "itemDescription": "Nope" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "ID must not be empty");

    let response = app
        .post_json(
            "/settings/oracle/database/license-types",
            json!({ "id": "L10001", "itemDescription": "Diagnostics Pack", "metric": "Named User Plus Perpetual" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .post_json("/settings/oracle/database/license-types", json!({ "id": "L10001" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .put_json(
            "/settings/oracle/database/license-types/L10002",
            json!({ "id": "L10001", "itemDescription": "Tuning Pack" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Object ID does not correspond");

    let response = app
        .put_json(
            "/settings/oracle/database/license-types/L10001",
            json!({ "id": "L10001", "itemDescription": "Tuning Pack" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let types = app.get("/settings/oracle/database/license-types").await.json();
    assert_eq!(types.as_array().unwrap().len(), 2);

    let response = app.delete("/settings/oracle/database/license-types/L10001").await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app.delete("/settings/oracle/database/license-types/L10001").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let types = app.get("/settings/microsoft/database/license-types").await.json();
    assert_eq!(types[0]["id"], "359-06320");
}

#[tokio::test]
async fn test_settings_features() {
    let app = TestApp::new();
    let features = app.get("/settings/features").await.json();
    assert_eq!(features["enableInsertingCustomPatchingFunction"], false);
    assert_eq!(features["readOnly"], false);

    let choices = app.get("/settings/default-database-tag-choiches").await.json();
    assert_eq!(choices, json!([]));
}

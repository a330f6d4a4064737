mod support;

use axum::body::Body;
use axum::http::{header, Method, StatusCode};
use chrono::{Months, TimeZone, Utc};
use serde_json::json;

use ercole_api::export::XLSX_CONTENT_TYPE;
use ercole_api::model::alert::ALERT_STATUS_NEW;
use ercole_api::model::{
    Alert, ExadataComponent, ExadataInstance, ExadataVm, Host, OracleDatabase, ObjectId,
    OracleDatabaseLicenseType, SegmentAdvisor,
};
use support::{read_xlsx, test_now, TestApp};

const EXADATA: &str = "/hosts/technologies/oracle/exadata";
const BOUNDARY: &str = "ercole-test-boundary";

fn exadata_app() -> TestApp {
    let app = TestApp::new();
    app.service.seed_exadata_instance(ExadataInstance {
        rack_id: "RACK01".to_string(),
        hostname: "exa01".to_string(),
        location: "Italy".to_string(),
        components: vec![ExadataComponent {
            host_id: "H01".to_string(),
            hostname: "exa01-db01".to_string(),
            total_memory: 512.0,
            cpu_enabled: 24,
            image_version: "21.2.0".to_string(),
            release_date: test_now().checked_sub_months(Months::new(5)),
            vms: vec![ExadataVm {
                name: "vm01".to_string(),
                cpu_current: 8,
                ..Default::default()
            }],
            ..Default::default()
        }],
        ..Default::default()
    });
    app
}

fn multipart(field: &str, content: &str) -> Body {
    Body::from(format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"contracts.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n{content}\r\n--{b}--\r\n",
        b = BOUNDARY,
        field = field,
        content = content,
    ))
}

async fn upload(app: &TestApp, database_type: &str, body: Body) -> support::TestResponse {
    let content_type = format!("multipart/form-data; boundary={}", BOUNDARY);
    app.send_with(
        Method::POST,
        &format!("/contracts/{}/upload", database_type),
        body,
        &[(header::CONTENT_TYPE, content_type.as_str())],
    )
    .await
}

// =============================================================================
// Exadata
// =============================================================================

#[tokio::test]
async fn test_exadata_hide_and_show() {
    let app = exadata_app();

    let visible = app.get(EXADATA).await.json();
    assert_eq!(visible[0]["rackID"], "RACK01");

    let response = app
        .send(Method::POST, &format!("{}/RACK01/hide", EXADATA), Body::empty())
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get(EXADATA).await.json(), json!([]));
    assert_eq!(app.get(&format!("{}/hidden", EXADATA)).await.json()[0]["rackID"], "RACK01");

    let response = app.delete(&format!("{}/RACK01/hide", EXADATA)).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .send(Method::POST, &format!("{}/RACK99/hide", EXADATA), Body::empty())
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_exadata_updates() {
    let app = exadata_app();

    let response = app
        .put_json(
            &format!("{}/RACK01/vms/H01/vm01/cluster-name", EXADATA),
            json!({ "clusterName": "cluster-a" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .put_json(
            &format!("{}/RACK01/components/H01/cluster-names", EXADATA),
            json!({ "clusterNames": ["cluster-a", "cluster-b"] }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .put_json(
            &format!("{}/RACK01/rdma", EXADATA),
            json!({ "network": "192.168.10.0/24", "ipAddresses": ["192.168.10.1"] }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let instance = app.get(&format!("{}/RACK01", EXADATA)).await.json();
    let component = &instance["components"][0];
    assert_eq!(component["vms"][0]["clusterName"], "cluster-a");
    assert_eq!(component["clusterNames"], json!(["cluster-a", "cluster-b"]));
    assert_eq!(instance["rdma"]["network"], "192.168.10.0/24");
}

#[tokio::test]
async fn test_exadata_patch_advisors() {
    let app = exadata_app();
    let advisors = app
        .get(&format!("{}/RACK01/patch-advisors", EXADATA))
        .await
        .json();

    assert_eq!(advisors[0]["hostname"], "exa01-db01");
    assert_eq!(advisors[0]["fourMonths"], false);
    assert_eq!(advisors[0]["sixMonths"], true);
    assert_eq!(advisors[0]["twelveMonths"], true);
}

#[tokio::test]
async fn test_exadata_exports_require_spreadsheet_accept() {
    let app = exadata_app();

    let response = app.get(&format!("{}/export", EXADATA)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "invalid Content-Type");
    assert_eq!(app.service.total_calls(), 0);

    let response = app.get_xlsx(&format!("{}/export", EXADATA)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), XLSX_CONTENT_TYPE);
    assert_eq!(
        response.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"exadata.xlsx\""
    );
    assert!(read_xlsx(&response.body).len() > 1);

    let response = app.get_xlsx(&format!("{}/patch-advisors/export", EXADATA)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_exadata_read_only() {
    let app = TestApp::read_only();
    let response = app
        .send(Method::POST, &format!("{}/RACK01/hide", EXADATA), Body::empty())
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(app.service.total_calls(), 0);
}

// =============================================================================
// Alerts
// =============================================================================

#[tokio::test]
async fn test_search_and_ack_alerts() {
    let app = TestApp::new();
    let id = app.service.seed_alert(Alert {
        alert_category: "LICENSE".to_string(),
        alert_code: "NEW_LICENSE".to_string(),
        alert_severity: "INFO".to_string(),
        alert_status: ALERT_STATUS_NEW.to_string(),
        date: Utc.with_ymd_and_hms(2019, 10, 1, 0, 0, 0).unwrap(),
        hostname: "foobar".to_string(),
        ..Default::default()
    });

    let page = app.get("/alerts?status=NEW&page=0&size=10").await.json();
    assert_eq!(page["content"][0]["hostname"], "foobar");

    let response = app.get("/alerts?from=2019-13-01").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .post_json("/alerts/ack", json!({ "ids": [ObjectId::generate().to_hex()] }))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.post_json("/alerts/ack", json!({ "ids": [id.to_hex()] })).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let rows = app.get("/alerts?status=NEW").await.json();
    assert_eq!(rows, json!([]));

    let response = app.get_xlsx("/alerts").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(read_xlsx(&response.body)[1][5], "foobar");
}

// =============================================================================
// Statistics and databases
// =============================================================================

fn database_app() -> TestApp {
    let app = TestApp::new();
    app.service.seed_host(Host {
        hostname: "foobar".to_string(),
        location: "Italy".to_string(),
        environment: "PROD".to_string(),
        oracle_databases: vec![
            OracleDatabase {
                name: "ERCOLE".to_string(),
                version: "19c".to_string(),
                work: 4.0,
                segment_advisors: vec![SegmentAdvisor {
                    reclaimable: 12.5,
                    ..Default::default()
                }],
                ..Default::default()
            },
            OracleDatabase {
                name: "TEST".to_string(),
                version: "12c".to_string(),
                work: 1.0,
                ..Default::default()
            },
        ],
        ..Default::default()
    });
    app
}

#[tokio::test]
async fn test_top_workload_honors_limit() {
    let app = database_app();

    let rows = app
        .get("/stats/technologies/oracle/databases/top-workload?limit=1")
        .await
        .json();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["dbname"], "ERCOLE");

    let rows = app
        .get("/stats/technologies/oracle/databases/top-reclaimable")
        .await
        .json();
    assert_eq!(rows[0]["reclaimableSegmentAdvisors"], 12.5);

    app.service.clear_calls();
    let response = app
        .get("/stats/technologies/oracle/databases/top-workload?limit=-3")
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.service.total_calls(), 0);
}

#[tokio::test]
async fn test_version_stats() {
    let app = database_app();
    let rows = app
        .get("/stats/technologies/oracle/databases/versions?location=Italy")
        .await
        .json();
    assert_eq!(rows.as_array().unwrap().len(), 2);

    let rows = app
        .get("/stats/technologies/oracle/databases/versions?location=Germany")
        .await
        .json();
    assert_eq!(rows, json!([]));
}

#[tokio::test]
async fn test_window_time_must_not_be_negative() {
    let app = database_app();

    let response = app
        .get("/hosts/technologies/oracle/databases/patch-advisors?window-time=-1")
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.error(), "Invalid value for window-time");

    let response = app
        .get("/stats/technologies/oracle/databases/patch-status?window-time=x")
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(app.service.total_calls(), 0);
}

#[tokio::test]
async fn test_patch_status_window_follows_clock() {
    let app = database_app();
    let response = app
        .get("/stats/technologies/oracle/databases/patch-status?window-time=2")
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let call = app.service.last_call().unwrap();
    assert!(call.args.contains("2019-09-05T14:02:03"));
}

#[tokio::test]
async fn test_exadata_totals() {
    let app = exadata_app();

    let memory = app
        .get("/stats/technologies/oracle/exadata/total-memory-size")
        .await
        .json();
    assert_eq!(memory, json!(512.0));

    let response = app.get("/stats/technologies/oracle/exadata/total-cpu").await;
    assert_eq!(response.status, StatusCode::OK);
}

// =============================================================================
// Contract uploads
// =============================================================================

#[tokio::test]
async fn test_upload_oracle_contracts() {
    let app = TestApp::new();
    app.service.seed_oracle_license_type(OracleDatabaseLicenseType {
        id: "A90611".to_string(),
        ..Default::default()
    });
    let csv = "contractID,csi,licenseTypeID,referenceNumber,unlimited,count,basket,restricted,hosts\n\
               CID001,CSI001,A90611,R001,false,10,true,false,host01;host02\n\
               CID002,CSI001,A90611,R002,false,5,false,true,\n";

    let response = upload(&app, "oracle", multipart("file", csv)).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let contracts = app.get("/contracts/oracle/database").await.json();
    let contracts = contracts["contracts"].as_array().unwrap();
    assert_eq!(contracts.len(), 2);
    assert_eq!(contracts[0]["hosts"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_upload_rejects_bad_requests() {
    let app = TestApp::new();

    let response = upload(&app, "postgres", multipart("file", "x")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = upload(&app, "mysql", multipart("document", "x")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Missing form field \"file\"");

    let response = upload(&app, "mysql", multipart("file", "contractID,type\nMID001")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.service.call_count("import_contracts"), 0);
}

#[tokio::test]
async fn test_upload_rejected_rows_are_unprocessable() {
    let app = TestApp::new();
    app.service.seed_oracle_license_type(OracleDatabaseLicenseType {
        id: "A90611".to_string(),
        ..Default::default()
    });
    let header = "contractID,csi,licenseTypeID,referenceNumber,unlimited,count,basket,restricted,hosts\n";

    let unlimited_not_basket = format!("{}CID001,CSI001,A90611,R001,true,10,false,false,\n", header);
    let response = upload(&app, "oracle", multipart("file", &unlimited_not_basket)).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.error(), "Contract is unlimited so it must be even Basket");

    let unknown_license = format!("{}CID002,CSI001,XXXXXX,R002,false,10,true,false,\n", header);
    let response = upload(&app, "oracle", multipart("file", &unknown_license)).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.error(), "License type id not found");
    assert_eq!(response.message(), "XXXXXX");

    assert_eq!(app.service.call_count("import_contracts"), 2);
    let contracts = app.get("/contracts/oracle/database").await.json();
    assert_eq!(contracts["contracts"], json!([]));
}

#[tokio::test]
async fn test_upload_read_only() {
    let app = TestApp::read_only();
    let response = upload(&app, "oracle", multipart("file", "")).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(app.service.total_calls(), 0);
}

#[tokio::test]
async fn test_contracts_sample() {
    let app = TestApp::new();
    let response = app.get("/contracts/sqlserver/sample").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), "text/csv");
    assert_eq!(
        response.headers.get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=sample_sqlserver_contracts.csv"
    );
    let text = String::from_utf8(response.body.to_vec()).unwrap();
    assert!(text.starts_with("contractID,type,licenseTypeID"));

    let response = app.get("/contracts/db2/sample").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

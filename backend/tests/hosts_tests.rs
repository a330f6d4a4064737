mod support;

use axum::body::Body;
use axum::http::{header, Method, StatusCode};
use serde_json::json;

use ercole_api::config::Configuration;
use ercole_api::export::XLSX_CONTENT_TYPE;
use ercole_api::model::{Cluster, DatabaseLicense, Host, MissingDatabase, OracleDatabase, VirtualMachine};
use support::{read_xlsx, TestApp};

fn host(hostname: &str, location: &str) -> Host {
    Host {
        hostname: hostname.to_string(),
        location: location.to_string(),
        environment: "PROD".to_string(),
        cpu_cores: 8,
        oracle_databases: vec![OracleDatabase {
            name: "ERCOLE".to_string(),
            version: "19c".to_string(),
            licenses: vec![DatabaseLicense {
                license_type_id: "A90611".to_string(),
                count: 4.0,
                ignored: false,
            }],
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn seeded() -> TestApp {
    let app = TestApp::new();
    app.service.seed_host(host("foobar", "Italy"));
    app.service.seed_host(host("barfoo", "Germany"));
    app.service.seed_host(host("test-db", "Italy"));
    app
}

#[tokio::test]
async fn test_search_hosts_returns_rows() {
    let app = seeded();
    let response = app.get("/hosts?mode=summary&location=Italy").await;

    assert_eq!(response.status, StatusCode::OK);
    let rows = response.json();
    assert_eq!(rows.as_array().unwrap().len(), 2);
    assert_eq!(app.service.call_count("search_hosts"), 1);
}

#[tokio::test]
async fn test_search_hosts_unwraps_single_page() {
    let app = seeded();
    let response = app.get("/hosts?mode=hostnames&sort-by=hostname&page=0&size=2").await;

    assert_eq!(response.status, StatusCode::OK);
    let page = response.json();
    assert_eq!(page["content"].as_array().unwrap().len(), 2);
    assert_eq!(page["content"][0]["hostname"], "barfoo");
    assert_eq!(page["metadata"]["totalElements"], 3);
    assert_eq!(page["metadata"]["totalPages"], 2);
}

#[tokio::test]
async fn test_search_hosts_rejects_bad_parameters_before_calling_service() {
    let app = seeded();

    let response = app.get("/hosts?sort-desc=maybe").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.message(), "Unable to parse string to bool");
    assert_eq!(response.error(), "parsing \"maybe\": invalid syntax");

    let response = app.get("/hosts?page=abc").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.message(), "Unable to parse string to int");

    let response = app.get("/hosts?older-than=yesterday").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.message(), "Unable to parse string to time");

    let response = app.get("/hosts?mode=everything").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(app.service.total_calls(), 0);
}

#[tokio::test]
async fn test_search_hosts_as_spreadsheet_uses_same_filter() {
    let app = seeded();
    let response = app.get_xlsx("/hosts?search=foo&location=Italy").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), XLSX_CONTENT_TYPE);
    assert_eq!(
        response.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"hosts.xlsx\""
    );
    assert_eq!(app.service.call_count("search_hosts"), 0);

    let call = app.service.last_call().unwrap();
    assert_eq!(call.method, "search_hosts_as_xlsx");
    assert!(call.args.contains("search: \"foo\""));
    assert!(call.args.contains("location: \"Italy\""));

    let rows = read_xlsx(&response.body);
    assert_eq!(rows[0][0], "Hostname");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "foobar");
}

#[tokio::test]
async fn test_get_host_not_found() {
    let app = seeded();
    let response = app.get("/hosts/nowhere").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "Host not found");
    assert_eq!(response.message(), "nowhere");
}

#[tokio::test]
async fn test_archive_host_hides_it() {
    let app = seeded();

    let response = app.delete("/hosts/foobar").await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app.get("/hosts/foobar").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.delete("/hosts/foobar").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tags_round_trip() {
    let app = seeded();

    let response = app
        .post_text("/hosts/foobar/technologies/oracle/databases/ERCOLE/tags", "foobar")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), serde_json::Value::Null);

    let host = app.get("/hosts/foobar").await.json();
    assert_eq!(host["oracleDatabases"][0]["tags"], json!(["foobar"]));

    let response = app
        .delete("/hosts/foobar/technologies/oracle/databases/ERCOLE/tags/foobar")
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .post_text("/hosts/foobar/technologies/oracle/databases/MISSING/tags", "foobar")
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_license_ignored_field() {
    let app = seeded();
    let base = "/hosts/foobar/technologies/oracle/databases/ERCOLE/licenses/A90611/ignored";

    let response = app.send(Method::PUT, &format!("{}/true", base), Body::empty()).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.send(Method::PUT, &format!("{}/sure", base), Body::empty()).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .send(
            Method::PUT,
            "/hosts/foobar/technologies/oracle/databases/ERCOLE/licenses/XXXXXX/ignored/true",
            Body::empty(),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patching_function_requires_feature_flag() {
    let app = seeded();
    let response = app
        .put_json("/hosts/foobar/patching-function", json!({ "code": "return 1" }))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "FORBIDDEN_REQUEST");
    assert_eq!(app.service.total_calls(), 0);
}

#[tokio::test]
async fn test_patching_function_set_and_get() {
    let mut config = Configuration::default();
    config.api_service.enable_inserting_custom_patching_function = true;
    let app = TestApp::with_config(config);
    app.service.seed_host(host("foobar", "Italy"));

    let response = app.get("/hosts/foobar/patching-function").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .put_json("/hosts/foobar/patching-function", json!({ "code": "" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .put_json(
            "/hosts/foobar/patching-function",
            json!({ "code": "return 1", "vars": { "foo": "bar" } }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["code"], "return 1");

    let function = app.get("/hosts/foobar/patching-function").await.json();
    assert_eq!(function["vars"]["foo"], "bar");

    let response = app.delete("/hosts/foobar/patching-function").await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let response = app.get("/hosts/foobar/patching-function").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.delete("/hosts/nowhere/patching-function").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "Host not found");
}

#[tokio::test]
async fn test_read_only_rejects_mutations_without_service_calls() {
    let app = TestApp::read_only();
    app.service.seed_host(host("foobar", "Italy"));

    let response = app.delete("/hosts/foobar").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "FORBIDDEN_REQUEST");

    let response = app
        .post_text("/hosts/foobar/technologies/oracle/databases/ERCOLE/tags", "foobar")
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.delete("/hosts/foobar/patching-function").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    assert_eq!(app.service.total_calls(), 0);

    let response = app.get("/hosts/foobar").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_locations_and_environments() {
    let app = seeded();

    let locations = app.get("/locations").await.json();
    assert_eq!(locations, json!(["Germany", "Italy"]));

    let environments = app.get("/environments?location=Germany").await.json();
    assert_eq!(environments, json!(["PROD"]));
}

#[tokio::test]
async fn test_service_failures_map_to_status() {
    use ercole_api::service::{ErrorKind, ServiceError};

    let app = seeded();

    app.service.fail_next(ServiceError::internal("connection reset"));
    let response = app.get("/hosts/foobar").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.message(), "Internal Server Error");

    app.service.fail_next(ServiceError::new(ErrorKind::HostNotFound));
    let response = app.delete("/hosts/foobar").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // The primed error is consumed by a single call.
    let response = app.get("/hosts/foobar").await;
    assert_eq!(response.status, StatusCode::OK);
}

// =============================================================================
// Clusters
// =============================================================================

fn clustered() -> TestApp {
    let app = seeded();
    let mut vcenter = host("vcenter", "Italy");
    vcenter.clusters = vec![
        Cluster {
            name: "Puzzait".to_string(),
            cluster_type: "vmware".to_string(),
            cpu: 140,
            sockets: 10,
            vms: vec![
                VirtualMachine {
                    name: "test-db".to_string(),
                    virtualization_node: "esxi1".to_string(),
                    ..Default::default()
                },
                VirtualMachine {
                    name: "test-web".to_string(),
                    virtualization_node: "esxi2".to_string(),
                    ..Default::default()
                },
            ],
        },
        Cluster {
            name: "Bart".to_string(),
            cluster_type: "ovm".to_string(),
            cpu: 20,
            sockets: 2,
            ..Default::default()
        },
    ];
    app.service.seed_host(vcenter);
    app
}

#[tokio::test]
async fn test_search_clusters() {
    let app = clustered();

    let rows = app.get("/clusters?sort-by=cpu").await.json();
    assert_eq!(rows.as_array().unwrap().len(), 2);
    assert_eq!(rows[0]["name"], "Bart");
    assert_eq!(rows[1]["physicalHosts"], json!(["esxi1", "esxi2"]));
    assert!(rows[1].get("vms").is_none());

    let page = app.get("/clusters?full=true&search=Puzzait&page=0&size=10").await.json();
    assert_eq!(page["content"][0]["vms"].as_array().unwrap().len(), 2);
    assert_eq!(page["metadata"]["totalElements"], 1);

    let response = app.get("/clusters?full=maybe").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.service.call_count("search_clusters"), 2);
}

#[tokio::test]
async fn test_search_clusters_as_spreadsheet() {
    let app = clustered();
    let response = app.get_xlsx("/clusters?location=Italy&sort-by=name").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"clusters.xlsx\""
    );
    let rows = read_xlsx(&response.body);
    assert_eq!(rows[0], vec!["Name", "Type", "CPU", "Sockets", "Physical Hosts"]);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][0], "Bart");
    assert_eq!(app.service.call_count("search_clusters_as_xlsx"), 1);
}

#[tokio::test]
async fn test_get_cluster() {
    let app = clustered();

    let response = app.get("/clusters/Puzzait").await;
    assert_eq!(response.status, StatusCode::OK);
    let cluster = response.json();
    assert_eq!(cluster["hostname"], "vcenter");
    assert_eq!(cluster["vmsCount"], 2);

    let response = app.get("/clusters/Puzzait?older-than=1960-01-01T00:00:00Z").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "Cluster not found");
    assert_eq!(response.message(), "Puzzait");

    let response = app.get("/clusters/Puzzait?older-than=yesterday").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

// =============================================================================
// Missing databases
// =============================================================================

fn with_missing_databases() -> TestApp {
    let app = TestApp::new();
    let mut foobar = host("foobar", "Italy");
    foobar.missing_databases = vec![MissingDatabase {
        name: "GHOST".to_string(),
        ..Default::default()
    }];
    app.service.seed_host(foobar);
    app.service.seed_host(host("barfoo", "Germany"));
    app
}

#[tokio::test]
async fn test_missing_databases() {
    let app = with_missing_databases();

    let missing = app.get("/hosts/missing-dbs").await.json();
    assert_eq!(
        missing,
        json!([{
            "hostname": "foobar",
            "missingDatabases": [{ "name": "GHOST", "ignored": false, "ignoredComment": "" }]
        }])
    );

    let response = app.get("/hosts/foobar/missing-dbs").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()[0]["name"], "GHOST");

    let response = app.get("/hosts/nowhere/missing-dbs").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.service.call_count("get_missing_databases_by_hostname"), 1);
}

#[tokio::test]
async fn test_missing_databases_outside_user_locations() {
    let app = with_missing_databases();

    let response = app
        .send_as(&app.user_token, Method::GET, "/hosts/foobar/missing-dbs", Body::empty())
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error(), "Permission denied");

    let response = app
        .send_as(
            &app.user_token,
            Method::PUT,
            "/hosts/foobar/missing-dbs/GHOST/ignored/true",
            Body::from(json!({ "ignoredComment": "gone" }).to_string()),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    assert_eq!(app.service.call_count("get_missing_databases_by_hostname"), 0);
    assert_eq!(app.service.call_count("update_missing_database_ignored_field"), 0);
}

#[tokio::test]
async fn test_missing_database_ignored_field() {
    let app = with_missing_databases();

    let response = app
        .put_json(
            "/hosts/foobar/missing-dbs/GHOST/ignored/true",
            json!({ "ignoredComment": "decommissioned" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let missing = app.get("/hosts/foobar/missing-dbs").await.json();
    assert_eq!(missing[0]["ignored"], true);
    assert_eq!(missing[0]["ignoredComment"], "decommissioned");

    let response = app
        .put_json("/hosts/foobar/missing-dbs/GHOST/ignored/perhaps", json!({}))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .put_json("/hosts/foobar/missing-dbs/GHOST/ignored/false", json!({ "reason": "x" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .put_json("/hosts/foobar/missing-dbs/ERCOLE/ignored/true", json!({}))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "ERCOLE");
    assert_eq!(app.service.call_count("update_missing_database_ignored_field"), 2);
}

#[tokio::test]
async fn test_read_only_rejects_missing_database_update() {
    let app = TestApp::read_only();
    app.service.seed_host(host("foobar", "Italy"));

    let response = app
        .put_json("/hosts/foobar/missing-dbs/GHOST/ignored/true", json!({}))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(app.service.total_calls(), 0);
}

//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (authentication, CORS,
//! compression, tracing), and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    admin, agreements, alerts, contracts, databases, exadata, hosts, scenarios, settings, stats, system,
    uploads,
};
use super::state::AppState;
use crate::auth::middleware::{require_admin, require_user};

const ORACLE_DATABASES: &str = "/hosts/technologies/oracle/databases";
const ALL_DATABASES: &str = "/hosts/technologies/all/databases";
const EXADATA: &str = "/hosts/technologies/oracle/exadata";
const ORACLE_STATS: &str = "/stats/technologies/oracle/databases";

fn host_routes() -> Router<AppState> {
    Router::new()
        .route("/hosts", get(hosts::search_hosts))
        .route("/hosts/{hostname}", get(hosts::get_host).delete(hosts::archive_host))
        .route(
            "/hosts/{hostname}/patching-function",
            get(hosts::get_patching_function)
                .put(hosts::set_patching_function)
                .delete(hosts::delete_patching_function),
        )
        .route(
            "/hosts/{hostname}/technologies/oracle/databases/{dbname}/tags",
            post(hosts::add_tag_to_oracle_database),
        )
        .route(
            "/hosts/{hostname}/technologies/oracle/databases/{dbname}/tags/{tagname}",
            axum::routing::delete(hosts::delete_tag_of_oracle_database),
        )
        .route(
            "/hosts/{hostname}/technologies/oracle/databases/{dbname}/licenses/{licenseTypeID}/ignored/{ignored}",
            put(hosts::set_license_ignored_field),
        )
        .route("/hosts/missing-dbs", get(databases::get_missing_databases))
        .route(
            "/hosts/{hostname}/missing-dbs",
            get(databases::get_missing_databases_by_hostname),
        )
        .route(
            "/hosts/{hostname}/missing-dbs/{dbname}/ignored/{ignored}",
            put(databases::update_missing_database_ignored_field),
        )
        .route("/clusters", get(hosts::search_clusters))
        .route("/clusters/{name}", get(hosts::get_cluster))
        .route("/locations", get(hosts::list_locations))
        .route("/environments", get(hosts::list_environments))
}

fn database_routes() -> Router<AppState> {
    Router::new()
        .route(ORACLE_DATABASES, get(databases::search_oracle_databases))
        .route(
            &format!("{}/addms", ORACLE_DATABASES),
            get(databases::search_oracle_database_addms),
        )
        .route(
            &format!("{}/segment-advisors", ORACLE_DATABASES),
            get(databases::search_oracle_database_segment_advisors),
        )
        .route(
            &format!("{}/patch-advisors", ORACLE_DATABASES),
            get(databases::search_oracle_database_patch_advisors),
        )
        .route(
            &format!("{}/agreements-parts", ORACLE_DATABASES),
            get(databases::get_oracle_database_agreement_parts),
        )
        .route(ALL_DATABASES, get(databases::list_all_databases))
        .route(
            &format!("{}/statistics", ALL_DATABASES),
            get(databases::get_databases_statistics),
        )
        .route(
            &format!("{}/licenses-used", ALL_DATABASES),
            get(databases::get_used_licenses_per_database),
        )
        .route(
            &format!("{}/licenses-compliance", ALL_DATABASES),
            get(databases::get_licenses_compliance),
        )
}

fn agreement_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/agreements/oracle/database",
            get(agreements::get_oracle_database_agreements)
                .post(agreements::add_oracle_database_agreement)
                .put(agreements::update_oracle_database_agreement),
        )
        .route(
            "/agreements/oracle/database/{id}",
            axum::routing::delete(agreements::delete_oracle_database_agreement),
        )
        .route(
            "/agreements/oracle/database/{id}/hosts",
            post(agreements::add_host_to_oracle_database_agreement),
        )
        .route(
            "/agreements/oracle/database/{id}/hosts/{hostname}",
            axum::routing::delete(agreements::delete_host_from_oracle_database_agreement),
        )
        .route(
            "/agreements/mysql/database",
            get(agreements::get_mysql_agreements).post(agreements::add_mysql_agreement),
        )
        .route(
            "/agreements/mysql/database/{id}",
            put(agreements::update_mysql_agreement).delete(agreements::delete_mysql_agreement),
        )
}

fn contract_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/contracts/oracle/database",
            get(contracts::get_oracle_database_contracts)
                .post(contracts::add_oracle_database_contract)
                .put(contracts::update_oracle_database_contract),
        )
        .route(
            "/contracts/oracle/database/{id}",
            axum::routing::delete(contracts::delete_oracle_database_contract),
        )
        .route(
            "/contracts/oracle/database/{id}/hosts",
            post(contracts::add_host_to_oracle_database_contract),
        )
        .route(
            "/contracts/oracle/database/{id}/hosts/{hostname}",
            axum::routing::delete(contracts::delete_host_from_oracle_database_contract),
        )
        .route(
            "/contracts/microsoft/database",
            get(contracts::get_sql_server_database_contracts)
                .post(contracts::add_sql_server_database_contract)
                .put(contracts::update_sql_server_database_contract),
        )
        .route(
            "/contracts/microsoft/database/{id}",
            axum::routing::delete(contracts::delete_sql_server_database_contract),
        )
        .route(
            "/contracts/mysql/database",
            get(contracts::get_mysql_contracts).post(contracts::add_mysql_contract),
        )
        .route(
            "/contracts/mysql/database/{id}",
            put(contracts::update_mysql_contract).delete(contracts::delete_mysql_contract),
        )
        .route("/contracts/{databaseType}/upload", post(uploads::upload_contracts))
        .route("/contracts/{databaseType}/sample", get(uploads::get_contracts_sample))
}

fn settings_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/settings/oracle/database/license-types",
            get(settings::get_oracle_database_license_types).post(settings::add_oracle_database_license_type),
        )
        .route(
            "/settings/oracle/database/license-types/{id}",
            put(settings::update_oracle_database_license_type)
                .delete(settings::delete_oracle_database_license_type),
        )
        .route(
            "/settings/microsoft/database/license-types",
            get(settings::get_sql_server_database_license_types),
        )
        .route(
            "/settings/default-database-tag-choiches",
            get(settings::get_default_database_tag_choices),
        )
        .route("/settings/features", get(settings::get_features))
}

fn exadata_routes() -> Router<AppState> {
    Router::new()
        .route(EXADATA, get(exadata::list_exadata_instances))
        .route(&format!("{}/hidden", EXADATA), get(exadata::list_hidden_exadata_instances))
        .route(&format!("{}/export", EXADATA), get(exadata::export_exadata_instances))
        .route(
            &format!("{}/patch-advisors/export", EXADATA),
            get(exadata::export_exadata_patch_advisors),
        )
        .route(&format!("{}/{{rackID}}", EXADATA), get(exadata::get_exadata_instance))
        .route(
            &format!("{}/{{rackID}}/patch-advisors", EXADATA),
            get(exadata::get_exadata_patch_advisors),
        )
        .route(
            &format!("{}/{{rackID}}/vms/{{hostID}}/{{name}}/cluster-name", EXADATA),
            put(exadata::update_exadata_vm_cluster_name),
        )
        .route(
            &format!("{}/{{rackID}}/components/{{hostID}}/cluster-names", EXADATA),
            put(exadata::update_exadata_component_cluster_names),
        )
        .route(&format!("{}/{{rackID}}/rdma", EXADATA), put(exadata::update_exadata_rdma))
        .route(
            &format!("{}/{{rackID}}/hide", EXADATA),
            post(exadata::hide_exadata_instance).delete(exadata::show_exadata_instance),
        )
}

fn scenario_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/scenarios",
            get(scenarios::list_scenarios).post(scenarios::create_scenario),
        )
        .route(
            "/scenarios/{id}",
            get(scenarios::get_scenario).delete(scenarios::remove_scenario),
        )
        .route(
            "/scenarios/{id}/license-compliance",
            get(scenarios::get_scenario_license_compliance),
        )
        .route(
            "/scenarios/{id}/license-used-database",
            get(scenarios::get_scenario_license_used_database),
        )
        .route(
            "/scenarios/{id}/license-used-host",
            get(scenarios::get_scenario_license_used_host),
        )
        .route(
            "/scenarios/{id}/license-used-cluster",
            get(scenarios::get_scenario_license_used_cluster),
        )
}

fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/alerts", get(alerts::search_alerts))
        .route("/alerts/ack", post(alerts::ack_alerts))
}

fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/stats/environments", get(stats::get_environment_stats))
        .route("/stats/types", get(stats::get_type_stats))
        .route("/stats/operating-systems", get(stats::get_operating_system_stats))
        .route(
            &format!("{}/environments", ORACLE_STATS),
            get(stats::get_oracle_database_environment_stats),
        )
        .route(
            &format!("{}/versions", ORACLE_STATS),
            get(stats::get_oracle_database_version_stats),
        )
        .route(
            &format!("{}/top-reclaimable", ORACLE_STATS),
            get(stats::get_top_reclaimable_oracle_databases),
        )
        .route(
            &format!("{}/patch-status", ORACLE_STATS),
            get(stats::get_oracle_database_patch_status_stats),
        )
        .route(
            &format!("{}/top-workload", ORACLE_STATS),
            get(stats::get_top_workload_oracle_databases),
        )
        .route(
            &format!("{}/dataguard-status", ORACLE_STATS),
            get(stats::get_oracle_database_dataguard_status_stats),
        )
        .route(
            &format!("{}/rac-status", ORACLE_STATS),
            get(stats::get_oracle_database_rac_status_stats),
        )
        .route(
            &format!("{}/archivelog-status", ORACLE_STATS),
            get(stats::get_oracle_database_archivelog_status_stats),
        )
        .route(
            "/stats/technologies/oracle/exadata/total-memory-size",
            get(stats::get_total_exadata_memory_size_stats),
        )
        .route(
            "/stats/technologies/oracle/exadata/total-cpu",
            get(stats::get_total_exadata_cpu_stats),
        )
}

/// Routes reserved to administrators.
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admins/groups", get(admin::get_groups).post(admin::insert_group))
        .route(
            "/admins/groups/{name}",
            get(admin::get_group).put(admin::update_group).delete(admin::delete_group),
        )
        .route("/admins/roles", get(admin::get_roles).post(admin::insert_role))
        .route(
            "/admins/roles/{name}",
            get(admin::get_role).put(admin::update_role).delete(admin::delete_role),
        )
        .route("/admins/users", get(admin::get_users).post(admin::add_user))
        .route(
            "/admins/users/{username}",
            get(admin::get_user).put(admin::update_user).delete(admin::remove_user),
        )
        .route("/admins/users/{username}/reset-password", post(admin::new_password))
        .route("/nodes", get(admin::get_nodes).post(admin::add_node))
        .route(
            "/nodes/{name}",
            get(admin::get_node).put(admin::update_node).delete(admin::delete_node),
        )
        .route_layer(middleware::from_fn(require_admin))
}

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected = Router::new()
        .merge(host_routes())
        .merge(database_routes())
        .merge(agreement_routes())
        .merge(contract_routes())
        .merge(settings_routes())
        .merge(exadata_routes())
        .merge(alert_routes())
        .merge(stats_routes())
        .merge(scenario_routes())
        .route("/users/{username}/change-password", put(admin::change_password))
        .merge(admin_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    Router::new()
        .route("/ping", get(system::ping))
        .route("/user/login", post(system::login))
        .merge(protected)
        // Contract uploads carry whole CSV files.
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

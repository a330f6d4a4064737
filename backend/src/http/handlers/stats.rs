//! Aggregated statistics for the dashboard charts.

use axum::{
    extract::State,
    Json,
};
use serde_json::Value;

use super::internal;
use crate::http::error::{ApiError, ApiResult};
use crate::http::params::QueryParams;
use crate::http::state::AppState;

/// Default number of rows of the top-N charts.
const DEFAULT_LIMIT: i32 = 15;

fn limit(params: &QueryParams) -> ApiResult<usize> {
    let limit = params.int("limit", DEFAULT_LIMIT)?;
    usize::try_from(limit).map_err(|_| ApiError::unprocessable("Invalid value for limit"))
}

/// Generates a handler answering with one global-filtered stats call.
macro_rules! global_stats {
    ($(#[$doc:meta])* $name:ident => $method:ident) => {
        $(#[$doc])*
        pub async fn $name(State(state): State<AppState>, params: QueryParams) -> ApiResult<Json<Vec<Value>>> {
            let filter = params.global_filter()?;
            let stats = state.service.$method(&filter).await.map_err(internal)?;
            Ok(Json(stats))
        }
    };
}

global_stats!(
    /// GET /stats/environments
    get_environment_stats => get_environment_stats
);
global_stats!(
    /// GET /stats/types
    get_type_stats => get_type_stats
);
global_stats!(
    /// GET /stats/operating-systems
    get_operating_system_stats => get_operating_system_stats
);
global_stats!(
    /// GET /stats/technologies/oracle/databases/environments
    get_oracle_database_environment_stats => get_oracle_database_environment_stats
);
global_stats!(
    /// GET /stats/technologies/oracle/databases/versions
    get_oracle_database_version_stats => get_oracle_database_version_stats
);
global_stats!(
    /// GET /stats/technologies/oracle/databases/dataguard-status
    get_oracle_database_dataguard_status_stats => get_oracle_database_dataguard_status_stats
);
global_stats!(
    /// GET /stats/technologies/oracle/databases/rac-status
    get_oracle_database_rac_status_stats => get_oracle_database_rac_status_stats
);
global_stats!(
    /// GET /stats/technologies/oracle/databases/archivelog-status
    get_oracle_database_archivelog_status_stats => get_oracle_database_archivelog_status_stats
);

/// GET /stats/technologies/oracle/databases/top-reclaimable
pub async fn get_top_reclaimable_oracle_databases(
    State(state): State<AppState>,
    params: QueryParams,
) -> ApiResult<Json<Vec<Value>>> {
    let filter = params.global_filter()?;
    let limit = limit(&params)?;
    let stats = state
        .service
        .get_top_reclaimable_oracle_databases(&filter, limit)
        .await
        .map_err(internal)?;
    Ok(Json(stats))
}

/// GET /stats/technologies/oracle/databases/top-workload
pub async fn get_top_workload_oracle_databases(
    State(state): State<AppState>,
    params: QueryParams,
) -> ApiResult<Json<Vec<Value>>> {
    let filter = params.global_filter()?;
    let limit = limit(&params)?;
    let stats = state
        .service
        .get_top_workload_oracle_databases(&filter, limit)
        .await
        .map_err(internal)?;
    Ok(Json(stats))
}

/// GET /stats/technologies/oracle/databases/patch-status
pub async fn get_oracle_database_patch_status_stats(
    State(state): State<AppState>,
    params: QueryParams,
) -> ApiResult<Json<Vec<Value>>> {
    let filter = params.global_filter()?;
    let window_start = params.window_start(state.now())?;
    let stats = state
        .service
        .get_oracle_database_patch_status_stats(&filter, window_start)
        .await
        .map_err(internal)?;
    Ok(Json(stats))
}

/// GET /stats/technologies/oracle/exadata/total-memory-size
pub async fn get_total_exadata_memory_size_stats(
    State(state): State<AppState>,
    params: QueryParams,
) -> ApiResult<Json<f64>> {
    let filter = params.global_filter()?;
    let total = state
        .service
        .get_total_exadata_memory_size_stats(&filter)
        .await
        .map_err(internal)?;
    Ok(Json(total))
}

/// GET /stats/technologies/oracle/exadata/total-cpu
pub async fn get_total_exadata_cpu_stats(
    State(state): State<AppState>,
    params: QueryParams,
) -> ApiResult<Json<Value>> {
    let filter = params.global_filter()?;
    let cpu = state
        .service
        .get_total_exadata_cpu_stats(&filter)
        .await
        .map_err(internal)?;
    Ok(Json(cpu))
}

use async_trait::async_trait;

use super::error::ServiceResult;
use crate::model::{CreateScenarioRequest, GlobalFilter, ObjectId, Scenario};

/// Service trait for what-if license scenarios.
#[async_trait]
pub trait ScenarioService: Send + Sync {
    /// Compute license usage before and after giving the requested hosts
    /// their simulated core counts, and store the result. Stored hosts are
    /// left untouched.
    async fn create_scenario(&self, request: CreateScenarioRequest, filter: &GlobalFilter) -> ServiceResult<Scenario>;

    async fn get_scenarios(&self) -> ServiceResult<Vec<Scenario>>;

    async fn get_scenario(&self, id: ObjectId) -> ServiceResult<Scenario>;

    async fn remove_scenario(&self, id: ObjectId) -> ServiceResult<()>;
}

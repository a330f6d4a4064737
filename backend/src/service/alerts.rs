use async_trait::async_trait;
use serde_json::Value;

use super::error::ServiceResult;
use crate::model::{AlertsFilter, ObjectId};

/// Service trait for alerts raised by the data service.
#[async_trait]
pub trait AlertService: Send + Sync {
    /// Search alerts, paged like the other `search_*` methods.
    async fn search_alerts(&self, filter: &AlertsFilter) -> ServiceResult<Vec<Value>>;

    async fn search_alerts_as_xlsx(&self, filter: &AlertsFilter) -> ServiceResult<Vec<u8>>;

    /// Acknowledge alerts. Unknown ids fail with `Alert not found`.
    async fn ack_alerts(&self, ids: Vec<ObjectId>) -> ServiceResult<()>;
}

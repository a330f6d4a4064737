use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ObjectId;

pub const ALERT_STATUS_NEW: &str = "NEW";
pub const ALERT_STATUS_ACK: &str = "ACK";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Alert {
    pub id: ObjectId,
    pub alert_category: String,
    pub alert_code: String,
    pub alert_severity: String,
    pub alert_status: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub hostname: String,
}

/// Body of `POST /alerts/ack`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct AckAlertsRequest {
    pub ids: Vec<ObjectId>,
}

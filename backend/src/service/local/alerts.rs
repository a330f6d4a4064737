use async_trait::async_trait;
use serde_json::Value;

use super::{not_found, records_workbook, search_rows, to_rows, LocalData, LocalService};
use crate::model::alert::ALERT_STATUS_ACK;
use crate::model::{Alert, AlertsFilter, ObjectId};
use crate::service::error::{ErrorKind, ServiceResult};
use crate::service::AlertService;

fn field_matches(wanted: &str, value: &str) -> bool {
    wanted.is_empty() || wanted == value
}

impl LocalData {
    fn matching_alerts(&self, filter: &AlertsFilter) -> Vec<&Alert> {
        self.alerts
            .iter()
            .filter(|a| {
                field_matches(&filter.category, &a.alert_category)
                    && field_matches(&filter.severity, &a.alert_severity)
                    && field_matches(&filter.status, &a.alert_status)
                    && a.date >= filter.from
                    && a.date <= filter.to
            })
            .collect()
    }
}

#[async_trait]
impl AlertService for LocalService {
    async fn search_alerts(&self, filter: &AlertsFilter) -> ServiceResult<Vec<Value>> {
        self.record("search_alerts", format!("{:?}", filter))?;
        let rows = to_rows(&self.data.read().matching_alerts(filter))?;
        Ok(search_rows(rows, &filter.search))
    }

    async fn search_alerts_as_xlsx(&self, filter: &AlertsFilter) -> ServiceResult<Vec<u8>> {
        self.record("search_alerts_as_xlsx", format!("{:?}", filter))?;
        let rows = to_rows(&self.data.read().matching_alerts(filter))?;
        let rows = search_rows(rows, &filter.search.unpaged());
        records_workbook(
            "Alerts",
            &["Date", "Category", "Code", "Severity", "Status", "Hostname", "Description"],
            &["date", "alertCategory", "alertCode", "alertSeverity", "alertStatus", "hostname", "description"],
            &rows,
        )
    }

    async fn ack_alerts(&self, ids: Vec<ObjectId>) -> ServiceResult<()> {
        self.record("ack_alerts", format!("{:?}", ids))?;
        let mut data = self.data.write();
        if let Some(missing) = ids.iter().find(|id| !data.alerts.iter().any(|a| a.id == **id)) {
            return Err(not_found(ErrorKind::AlertNotFound, missing));
        }
        for alert in data.alerts.iter_mut().filter(|a| ids.contains(&a.id)) {
            alert.alert_status = ALERT_STATUS_ACK.to_string();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::model::alert::ALERT_STATUS_NEW;
    use crate::model::filter::max_time;
    use crate::model::SearchFilter;

    fn filter() -> AlertsFilter {
        AlertsFilter {
            search: SearchFilter::default(),
            category: String::new(),
            severity: String::new(),
            status: String::new(),
            from: DateTime::<Utc>::MIN_UTC,
            to: max_time(),
        }
    }

    #[tokio::test]
    async fn test_ack_marks_alerts() {
        let service = LocalService::new();
        let id = service.seed_alert(Alert {
            alert_category: "LICENSE".to_string(),
            alert_status: ALERT_STATUS_NEW.to_string(),
            date: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            ..Default::default()
        });

        let mut only_new = filter();
        only_new.status = ALERT_STATUS_NEW.to_string();
        assert_eq!(service.search_alerts(&only_new).await.unwrap().len(), 1);

        service.ack_alerts(vec![id]).await.unwrap();
        assert!(service.search_alerts(&only_new).await.unwrap().is_empty());

        let err = service.ack_alerts(vec![ObjectId::generate()]).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlertNotFound);
    }

    #[tokio::test]
    async fn test_date_window() {
        let service = LocalService::new();
        service.seed_alert(Alert {
            date: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            ..Default::default()
        });
        let mut recent = filter();
        recent.from = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        assert!(service.search_alerts(&recent).await.unwrap().is_empty());
    }
}

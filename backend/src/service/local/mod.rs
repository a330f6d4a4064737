//! In-memory service implementation.
//!
//! This module provides a local implementation of all service traits
//! suitable for unit testing and local development. All data is stored in
//! memory behind a single lock. A service built with
//! [`LocalService::recording`] also records every call, so tests can assert
//! which methods a handler invoked and with which arguments.

mod admin;
mod agreements;
mod alerts;
mod contracts;
mod databases;
mod exadata;
mod hosts;
mod license_types;
mod scenarios;
mod stats;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::{json, Value};
use tracing::debug;

use super::{system_clock, Clock, ErrorKind, ServiceError, ServiceResult};
use crate::export::{ExportError, Workbook};
use crate::model::admin::{ADMIN_GROUP, SUPER_USER};
use crate::model::filter::text_matches;
use crate::model::{
    Alert, AssociatedHost, ExadataInstance, Group, Host, MySqlAgreement, MySqlContract, Node, OracleDatabaseAgreement,
    ObjectId, OracleDatabaseAgreementPart, OracleDatabaseContract, OracleDatabaseLicenseType, PatchingFunction,
    Role, Scenario, SearchFilter, SqlServerDatabaseContract, SqlServerDatabaseLicenseType, User,
};

/// A service call as seen by [`LocalService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: String,
    /// Debug rendering of the arguments.
    pub args: String,
}

/// In-memory service.
///
/// # Example
/// ```ignore
/// use ercole_api::service::{HostService, LocalService};
///
/// #[tokio::test]
/// async fn test_host_lookup() {
///     let service = LocalService::new().recording();
///     service.seed_host(Host { hostname: "foo".into(), ..Default::default() });
///
///     let host = service.get_host("foo").await.unwrap();
///     assert_eq!(service.call_count("get_host"), 1);
/// }
/// ```
#[derive(Clone)]
pub struct LocalService {
    data: Arc<RwLock<LocalData>>,
    clock: Clock,
    recording: bool,
}

#[derive(Default)]
struct LocalData {
    hosts: BTreeMap<String, Host>,
    patching_functions: BTreeMap<String, PatchingFunction>,

    agreements: Vec<OracleDatabaseAgreement>,
    agreement_parts: Vec<OracleDatabaseAgreementPart>,
    mysql_agreements: Vec<MySqlAgreement>,
    oracle_contracts: Vec<OracleDatabaseContract>,
    sql_server_contracts: Vec<SqlServerDatabaseContract>,
    mysql_contracts: Vec<MySqlContract>,

    oracle_license_types: Vec<OracleDatabaseLicenseType>,
    sql_server_license_types: Vec<SqlServerDatabaseLicenseType>,

    groups: Vec<Group>,
    roles: Vec<Role>,
    users: Vec<User>,
    nodes: Vec<Node>,

    exadata: Vec<ExadataInstance>,
    alerts: Vec<Alert>,
    scenarios: Vec<Scenario>,

    // Call recording
    calls: Vec<RecordedCall>,
    next_error: Option<ServiceError>,
}

impl LocalService {
    /// Create an empty service using the system clock.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
            clock: system_clock(),
            recording: false,
        }
    }

    /// Record every call and honor [`LocalService::fail_next`].
    pub fn recording(mut self) -> Self {
        self.recording = true;
        self
    }

    /// Replace the clock used for timestamps and time windows.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    // ==================== Seeding ====================

    pub fn seed_host(&self, host: Host) {
        self.data.write().hosts.insert(host.hostname.clone(), host);
    }

    pub fn seed_patching_function(&self, function: PatchingFunction) {
        self.data
            .write()
            .patching_functions
            .insert(function.hostname.clone(), function);
    }

    pub fn seed_oracle_license_type(&self, license_type: OracleDatabaseLicenseType) {
        self.data.write().oracle_license_types.push(license_type);
    }

    pub fn seed_sql_server_license_type(&self, license_type: SqlServerDatabaseLicenseType) {
        self.data.write().sql_server_license_types.push(license_type);
    }

    pub fn seed_agreement_part(&self, part: OracleDatabaseAgreementPart) {
        self.data.write().agreement_parts.push(part);
    }

    /// Store an agreement as is, assigning an id when it has none.
    pub fn seed_agreement(&self, mut agreement: OracleDatabaseAgreement) -> ObjectId {
        if agreement.id.is_nil() {
            agreement.id = ObjectId::generate();
        }
        let id = agreement.id;
        self.data.write().agreements.push(agreement);
        id
    }

    pub fn seed_mysql_agreement(&self, mut agreement: MySqlAgreement) -> ObjectId {
        if agreement.id.is_nil() {
            agreement.id = ObjectId::generate();
        }
        let id = agreement.id;
        self.data.write().mysql_agreements.push(agreement);
        id
    }

    /// Store an Oracle contract as is, assigning an id when it has none.
    pub fn seed_oracle_contract(&self, mut contract: OracleDatabaseContract) -> ObjectId {
        if contract.id.is_nil() {
            contract.id = ObjectId::generate();
        }
        let id = contract.id;
        self.data.write().oracle_contracts.push(contract);
        id
    }

    pub fn seed_mysql_contract(&self, mut contract: MySqlContract) -> ObjectId {
        if contract.id.is_nil() {
            contract.id = ObjectId::generate();
        }
        let id = contract.id;
        self.data.write().mysql_contracts.push(contract);
        id
    }

    pub fn seed_group(&self, group: Group) {
        self.data.write().groups.push(group);
    }

    pub fn seed_role(&self, role: Role) {
        self.data.write().roles.push(role);
    }

    pub fn seed_user(&self, user: User) {
        self.data.write().users.push(user);
    }

    pub fn seed_node(&self, node: Node) {
        self.data.write().nodes.push(node);
    }

    pub fn seed_exadata_instance(&self, instance: ExadataInstance) {
        self.data.write().exadata.push(instance);
    }

    pub fn seed_alert(&self, mut alert: Alert) -> ObjectId {
        if alert.id.is_nil() {
            alert.id = ObjectId::generate();
        }
        let id = alert.id;
        self.data.write().alerts.push(alert);
        id
    }

    /// Seed the built-in administrator with the given password.
    pub fn with_super_user(self, password: &str) -> Self {
        self.seed_user(User {
            username: SUPER_USER.to_string(),
            first_name: "Ercole".to_string(),
            password: password.to_string(),
            groups: vec![ADMIN_GROUP.to_string()],
            provider: "basic".to_string(),
            ..Default::default()
        });
        self.seed_group(Group {
            name: ADMIN_GROUP.to_string(),
            roles: vec!["admin".to_string()],
        });
        self
    }

    // ==================== Call recording ====================

    /// Make the next service call fail with `err`, whatever its arguments.
    /// Only a recording service consumes the primed error.
    pub fn fail_next(&self, err: ServiceError) {
        self.data.write().next_error = Some(err);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.data.read().calls.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.data.read().calls.iter().filter(|c| c.method == method).count()
    }

    pub fn total_calls(&self) -> usize {
        self.data.read().calls.len()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.data.read().calls.last().cloned()
    }

    pub fn clear_calls(&self) {
        self.data.write().calls.clear();
    }

    /// Record a call and return the primed error, if any.
    fn record(&self, method: &str, args: String) -> ServiceResult<()> {
        debug!(method, args = %args, "Local service call");
        if !self.recording {
            return Ok(());
        }
        let mut data = self.data.write();
        data.calls.push(RecordedCall {
            method: method.to_string(),
            args,
        });
        match data.next_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for LocalService {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ExportError> for ServiceError {
    fn from(err: ExportError) -> Self {
        ServiceError::internal(err.to_string())
    }
}

fn not_found(kind: ErrorKind, what: impl std::fmt::Display) -> ServiceError {
    ServiceError::new(kind).with_message(what.to_string())
}

// =============================================================================
// Row helpers
// =============================================================================

/// Whether every whitespace-separated keyword occurs in some string field.
fn row_matches(row: &Value, search: &str) -> bool {
    let fields: Vec<&str> = match row.as_object() {
        Some(object) => object.values().filter_map(Value::as_str).collect(),
        None => Vec::new(),
    };
    search
        .split_whitespace()
        .all(|keyword| fields.iter().any(|field| text_matches(keyword, field)))
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Apply text search and sorting, then the pagination convention: a paged
/// filter yields a single page object, otherwise every row is returned.
fn search_rows(rows: Vec<Value>, filter: &SearchFilter) -> Vec<Value> {
    let mut rows: Vec<Value> = rows
        .into_iter()
        .filter(|row| row_matches(row, &filter.search))
        .collect();
    if !filter.sort_by.is_empty() {
        rows.sort_by(|a, b| compare_values(a.get(&filter.sort_by), b.get(&filter.sort_by)));
        if filter.sort_desc {
            rows.reverse();
        }
    }
    paginate(rows, filter)
}

fn paginate(rows: Vec<Value>, filter: &SearchFilter) -> Vec<Value> {
    if !filter.is_paged() {
        return rows;
    }
    let size = filter.size.max(0) as usize;
    let page = filter.page.max(0) as usize;
    let total = rows.len();
    let total_pages = if size == 0 { 0 } else { total.div_ceil(size) };
    let content: Vec<Value> = rows.into_iter().skip(page * size).take(size).collect();
    let empty = content.is_empty();
    vec![json!({
        "content": content,
        "metadata": {
            "totalElements": total,
            "totalPages": total_pages,
            "size": size,
            "number": page,
            "first": page == 0,
            "last": page + 1 >= total_pages,
            "empty": empty,
        }
    })]
}

/// Single-sheet workbook with one row per record.
fn records_workbook(sheet: &str, headers: &[&str], keys: &[&str], records: &[Value]) -> ServiceResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    workbook.add_sheet(sheet, headers).push_records(keys, records);
    Ok(workbook.to_bytes()?)
}

fn to_rows<T: serde::Serialize>(items: &[T]) -> ServiceResult<Vec<Value>> {
    items
        .iter()
        .map(|item| serde_json::to_value(item).map_err(|e| ServiceError::internal(e.to_string())))
        .collect()
}

// =============================================================================
// License coverage
// =============================================================================

/// Description of a license type as shown next to agreements and contracts.
struct LicenseTypeInfo {
    item_description: String,
    metric: String,
    named_user: bool,
}

impl LocalData {
    fn oracle_license_type(&self, id: &str) -> Option<&OracleDatabaseLicenseType> {
        self.oracle_license_types.iter().find(|lt| lt.id == id)
    }

    fn license_type_info(&self, id: &str) -> LicenseTypeInfo {
        match self.oracle_license_type(id) {
            Some(lt) => LicenseTypeInfo {
                item_description: lt.item_description.clone(),
                metric: lt.metric.clone(),
                named_user: lt.is_named_user(),
            },
            None => LicenseTypeInfo {
                item_description: String::new(),
                metric: String::new(),
                named_user: false,
            },
        }
    }

    /// Licenses of `license_type_id` consumed by the databases of `hostname`.
    fn consumed_licenses(&self, hostname: &str, license_type_id: &str) -> f64 {
        self.hosts
            .get(hostname)
            .map(|host| {
                host.oracle_databases
                    .iter()
                    .flat_map(|db| db.licenses.iter())
                    .filter(|l| l.license_type_id == license_type_id && !l.ignored)
                    .map(|l| l.count)
                    .sum()
            })
            .unwrap_or(0.0)
    }

    /// Spread `count` licenses over `hosts` in order. Returns the associated
    /// hosts and what is left uncovered.
    fn coverage(&self, license_type_id: &str, count: i64, unlimited: bool, hosts: &[String]) -> (Vec<AssociatedHost>, f64) {
        let mut available = count as f64;
        let associated = hosts
            .iter()
            .map(|hostname| {
                let consumed = self.consumed_licenses(hostname, license_type_id);
                let covered = if unlimited { consumed } else { consumed.min(available.max(0.0)) };
                if !unlimited {
                    available -= covered;
                }
                AssociatedHost {
                    hostname: hostname.clone(),
                    covered_licenses_count: covered,
                    total_covered_licenses_count: covered,
                    consumed_licenses_count: consumed,
                }
            })
            .collect();
        (associated, available.max(0.0))
    }

    fn host_outside_cluster(&self, hostname: &str) -> bool {
        self.hosts
            .get(hostname)
            .is_some_and(|host| !host.archived && host.cluster.is_none())
    }
}

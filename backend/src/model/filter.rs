//! Typed filter sets built from query parameters.

use chrono::{DateTime, Utc};

/// Sentinel for "no bound" in integer range filters and for "no pagination".
pub const UNSET: i32 = -1;

/// Latest representable instant, the default of `older-than`.
pub fn max_time() -> DateTime<Utc> {
    DateTime::<Utc>::MAX_UTC
}

/// Location/environment scoping shared by most read endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalFilter {
    pub location: String,
    pub environment: String,
    pub older_than: DateTime<Utc>,
}

impl Default for GlobalFilter {
    fn default() -> Self {
        Self {
            location: String::new(),
            environment: String::new(),
            older_than: max_time(),
        }
    }
}

impl GlobalFilter {
    pub fn matches(&self, location: &str, environment: &str, created_at: DateTime<Utc>) -> bool {
        (self.location.is_empty() || self.location == location)
            && (self.environment.is_empty() || self.environment == environment)
            && created_at <= self.older_than
    }
}

/// Search, sort and pagination parameters of collection endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    pub search: String,
    pub sort_by: String,
    pub sort_desc: bool,
    pub page: i32,
    pub size: i32,
    pub global: GlobalFilter,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort_by: String::new(),
            sort_desc: false,
            page: UNSET,
            size: UNSET,
            global: GlobalFilter::default(),
        }
    }
}

impl SearchFilter {
    /// A page is requested only when both `page` and `size` are set.
    pub fn is_paged(&self) -> bool {
        self.page != UNSET && self.size != UNSET
    }

    /// Same filter with pagination disabled, used by spreadsheet exports.
    pub fn unpaged(&self) -> Self {
        Self {
            page: UNSET,
            size: UNSET,
            ..self.clone()
        }
    }
}

/// Filter of the addm, segment advisor and patch advisor searches.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorFilter {
    pub search: SearchFilter,
    /// Start of the trailing window (now minus `window-time` months).
    pub window_start: DateTime<Utc>,
    pub status: String,
}

/// Inclusive integer bounds where [`UNSET`] disables a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountRange {
    pub lte: i32,
    pub gte: i32,
}

impl Default for CountRange {
    fn default() -> Self {
        Self {
            lte: UNSET,
            gte: UNSET,
        }
    }
}

impl CountRange {
    pub fn contains(&self, value: f64) -> bool {
        (self.lte == UNSET || value <= f64::from(self.lte))
            && (self.gte == UNSET || value >= f64::from(self.gte))
    }
}

/// Tri-state flag filter: `None` ignores the flag.
pub fn flag_matches(filter: Option<bool>, value: bool) -> bool {
    filter.map_or(true, |wanted| wanted == value)
}

/// Case-insensitive substring match where an empty needle always matches.
pub fn text_matches(needle: &str, haystack: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OracleDatabaseAgreementsFilter {
    pub agreement_id: String,
    pub license_type_id: String,
    pub item_description: String,
    pub csi: String,
    pub metric: String,
    pub reference_number: String,
    pub unlimited: Option<bool>,
    pub catch_all: Option<bool>,
    pub licenses_per_core: CountRange,
    pub licenses_per_user: CountRange,
    pub available_licenses_per_core: CountRange,
    pub available_licenses_per_user: CountRange,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OracleDatabaseContractsFilter {
    pub contract_id: String,
    pub license_type_id: String,
    pub item_description: String,
    pub csi: String,
    pub metric: String,
    pub reference_number: String,
    pub unlimited: Option<bool>,
    pub basket: Option<bool>,
    pub licenses_per_core: CountRange,
    pub licenses_per_user: CountRange,
    pub available_licenses_per_core: CountRange,
    pub available_licenses_per_user: CountRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertsFilter {
    pub search: SearchFilter,
    pub category: String,
    pub severity: String,
    pub status: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

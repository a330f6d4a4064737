//! Error types for service operations.
//!
//! Every failure carries an [`ErrorKind`]; handlers switch on the kind to pick
//! the HTTP status, so the classification never depends on message text.

use std::fmt;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Classification of a service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AgreementNotFound,
    ContractNotFound,
    LicenseTypeIdNotFound,
    NotInClusterHostNotFound,
    HostNotFound,
    ClusterNotFound,
    PatchingFunctionNotFound,
    GroupNotFound,
    RoleNotFound,
    UserNotFound,
    NodeNotFound,
    ExadataNotFound,
    AlertNotFound,
    GroupCannotBeDeleted,
    SuperUserCannotBeDeleted,
    InvalidUser,
    InvalidPassword,
    PermissionDenied,
    Duplicated,
    /// Input rejected by service-level validation.
    Validation,
    /// Anything else: storage failures, broken invariants.
    Internal,
}

impl ErrorKind {
    /// Canonical error text sent to clients in the `error` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "Not found",
            Self::AgreementNotFound => "Agreement not found",
            Self::ContractNotFound => "Contract not found",
            Self::LicenseTypeIdNotFound => "License type id not found",
            Self::NotInClusterHostNotFound => "Not in cluster host not found",
            Self::HostNotFound => "Host not found",
            Self::ClusterNotFound => "Cluster not found",
            Self::PatchingFunctionNotFound => "Patching function not found",
            Self::GroupNotFound => "Group not found",
            Self::RoleNotFound => "Role not found",
            Self::UserNotFound => "User not found",
            Self::NodeNotFound => "Node not found",
            Self::ExadataNotFound => "Exadata not found",
            Self::AlertNotFound => "Alert not found",
            Self::GroupCannotBeDeleted => "Group cannot be deleted",
            Self::SuperUserCannotBeDeleted => "Super user cannot be deleted",
            Self::InvalidUser => "Invalid user",
            Self::InvalidPassword => "Invalid password",
            Self::PermissionDenied => "Permission denied",
            Self::Duplicated => "Duplicated",
            Self::Validation => "Validation error",
            Self::Internal => "Internal error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by every service method.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{description}")]
pub struct ServiceError {
    pub kind: ErrorKind,
    /// Text of the `error` field; the kind's canonical text unless overridden.
    pub description: String,
    /// Contextual message for the `message` field.
    pub message: Option<String>,
}

impl ServiceError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            description: kind.as_str().to_string(),
            message: None,
        }
    }

    /// Create a validation error with a specific description.
    pub fn validation(description: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            description: description.into(),
            message: None,
        }
    }

    /// Create an internal error with a specific description.
    pub fn internal(description: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Internal,
            description: description.into(),
            message: None,
        }
    }

    /// Attach a contextual message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl From<ErrorKind> for ServiceError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

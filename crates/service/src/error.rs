use thiserror::Error;

use motocrm_auth::AuthzError;
use motocrm_core::DomainError;
use motocrm_store::StoreError;

/// Operation-level error returned to the API layer.
///
/// Failure kinds are preserved across layers — a store-level duplicate order
/// number stays a `Conflict`, never a generic failure, so callers know to
/// retry the whole approval rather than resubmit identical data.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("not found")]
    NotFound,

    #[error("forbidden")]
    Forbidden,

    #[error("conflict: {0}")]
    Conflict(String),

    /// Backend failure with no domain meaning.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::InvariantViolation(msg) => ServiceError::InvariantViolation(msg),
            DomainError::InvalidId(msg) => ServiceError::Validation(msg),
            DomainError::NotFound => ServiceError::NotFound,
            DomainError::Conflict(msg) => ServiceError::Conflict(msg),
            DomainError::Forbidden => ServiceError::Forbidden,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => ServiceError::NotFound,
            StoreError::DuplicateEmail(email) => {
                ServiceError::Validation(format!("a customer with email '{email}' already exists"))
            }
            StoreError::DuplicateOrderNumber(n) => {
                ServiceError::Conflict(format!("order number '{n}' is already assigned"))
            }
            StoreError::Domain(e) => ServiceError::from(e),
            StoreError::Poisoned => ServiceError::Store(StoreError::Poisoned),
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(_: AuthzError) -> Self {
        ServiceError::Forbidden
    }
}

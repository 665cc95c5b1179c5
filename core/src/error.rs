//! Typed errors surfaced by the core engine (spec §7).
//!
//! `StorageTransient` is an internal retry signal; it is caught by
//! [`crate::store::retry`] and must never be returned from a public
//! `Store` method. Everything else propagates to the UI adapter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no active employee for tag {0}")]
    UnknownTag(String),

    #[error("tag {0} is already assigned to an employee")]
    DuplicateTag(String),

    #[error("employee {0} is not active")]
    InactiveEmployee(i64),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("the first registered employee must be an admin")]
    FirstUserMustBeAdmin,

    /// Retryable storage error (busy/locked). Caught internally by the
    /// retry loop; reaching a caller is a bug.
    #[error("transient storage error: {0}")]
    StorageTransient(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("action recalculation failed for employee {0}: {1}")]
    RecalculationFailed(i64, String),

    #[error("scanned tag does not match the employee pending identification")]
    PendingIdentificationMismatch,
}

pub type Result<T> = std::result::Result<T, Error>;

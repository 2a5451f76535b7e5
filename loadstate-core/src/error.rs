//! Error types for the loader core.
//!
//! Fetch failures are not errors in this sense: they are stored as data in
//! [`Loader::Failed`](crate::loader::Loader::Failed). The variants here cover
//! misuse of the loader API, which the type system cannot rule out on its own.

use thiserror::Error;

/// Errors raised when a caller asks for an illegal loader transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    /// A failed fetch must carry at least one error.
    #[error("a failed loader needs at least one error")]
    EmptyErrors,
}

/// Result alias used throughout the crate.
pub type Result<T, E = LoaderError> = std::result::Result<T, E>;

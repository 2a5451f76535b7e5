//! The `Loader` state type and its transitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::FetchErrors;
use crate::error::Result;

/// The cached outcome of an asynchronous retrieval.
///
/// # Type Parameters
///
/// - `T`: the payload produced by a successful fetch.
/// - `E`: the error type reported by a failed fetch.
///
/// # Example
///
/// ```rust
/// use loadstate_core::loader::{FetchErrors, Loader};
///
/// let mut loader: Loader<u32, String> = Loader::new();
/// assert!(!loader.is_loading());
///
/// loader.start();
/// assert!(loader.is_loading());
///
/// loader.succeed(7);
/// assert_eq!(loader.payload(), Some(&7));
///
/// loader.fail(FetchErrors::one("offline".to_string()));
/// assert_eq!(loader.payload(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Loader<T, E> {
    /// No outcome yet.
    Pending {
        /// Whether a fetch is in flight.
        loading: bool,
    },

    /// The last fetch failed.
    Failed {
        /// Errors in the order they were reported. Never empty.
        errors: FetchErrors<E>,
    },

    /// The last fetch succeeded.
    Succeeded {
        /// The fetched value.
        payload: T,
    },
}

/// Which of the loader's shapes is current, without the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderPhase {
    /// `Pending { loading: false }`
    Idle,
    /// `Pending { loading: true }`
    Loading,
    Failed,
    Succeeded,
}

impl fmt::Display for LoaderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoaderPhase::Idle => "idle",
            LoaderPhase::Loading => "loading",
            LoaderPhase::Failed => "failed",
            LoaderPhase::Succeeded => "succeeded",
        };
        f.write_str(name)
    }
}

impl<T, E> Loader<T, E> {
    /// Create an idle loader: not loading, no payload, no errors.
    pub fn new() -> Self {
        Loader::Pending { loading: false }
    }

    /// Mark a fetch as started. Any previous payload or errors are dropped.
    pub fn start(&mut self) {
        *self = Loader::Pending { loading: true };
    }

    /// Return to idle, dropping any payload or errors.
    pub fn reset(&mut self) {
        *self = Loader::Pending { loading: false };
    }

    /// Record a successful fetch.
    pub fn succeed(&mut self, payload: T) {
        *self = Loader::Succeeded { payload };
    }

    /// Record a failed fetch.
    pub fn fail(&mut self, errors: FetchErrors<E>) {
        *self = Loader::Failed { errors };
    }

    /// Record a failed fetch from an arbitrary error sequence.
    ///
    /// An empty sequence is rejected and the loader is left untouched.
    pub fn fail_with<I>(&mut self, errors: I) -> Result<()>
    where
        I: IntoIterator<Item = E>,
    {
        let errors = FetchErrors::new(errors)?;
        self.fail(errors);
        Ok(())
    }

    /// Record the outcome of a fetch, whichever way it went.
    pub fn settle(&mut self, outcome: std::result::Result<T, FetchErrors<E>>) {
        match outcome {
            Ok(payload) => self.succeed(payload),
            Err(errors) => self.fail(errors),
        }
    }

    /// Whether a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Loader::Pending { loading: true })
    }

    /// The payload, if the last fetch succeeded.
    pub fn payload(&self) -> Option<&T> {
        match self {
            Loader::Succeeded { payload } => Some(payload),
            _ => None,
        }
    }

    /// The errors, if the last fetch failed.
    pub fn errors(&self) -> Option<&[E]> {
        match self {
            Loader::Failed { errors } => Some(&**errors),
            _ => None,
        }
    }

    pub fn phase(&self) -> LoaderPhase {
        match self {
            Loader::Pending { loading: false } => LoaderPhase::Idle,
            Loader::Pending { loading: true } => LoaderPhase::Loading,
            Loader::Failed { .. } => LoaderPhase::Failed,
            Loader::Succeeded { .. } => LoaderPhase::Succeeded,
        }
    }
}

impl<T, E> Default for Loader<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

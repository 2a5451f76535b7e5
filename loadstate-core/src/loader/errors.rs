//! Non-empty error lists for failed loaders.

use std::fmt;
use std::ops::Deref;

use serde::de::{Deserialize, Deserializer, Error as _};
use serde::ser::{Serialize, Serializer};
use smallvec::SmallVec;

use crate::error::{LoaderError, Result};

/// An ordered, non-empty sequence of fetch errors.
///
/// Most failures carry a single error, so the first one is stored inline.
#[derive(Clone, PartialEq, Eq)]
pub struct FetchErrors<E>(SmallVec<[E; 1]>);

impl<E> FetchErrors<E> {
    /// Build an error list holding exactly one error.
    pub fn one(error: E) -> Self {
        let mut errors = SmallVec::new();
        errors.push(error);
        Self(errors)
    }

    /// Build an error list from any sequence, keeping the supplied order.
    ///
    /// Returns [`LoaderError::EmptyErrors`] if the sequence is empty.
    pub fn new<I>(errors: I) -> Result<Self>
    where
        I: IntoIterator<Item = E>,
    {
        let errors: SmallVec<[E; 1]> = errors.into_iter().collect();
        if errors.is_empty() {
            return Err(LoaderError::EmptyErrors);
        }
        Ok(Self(errors))
    }

    /// The first error reported.
    pub fn first(&self) -> &E {
        // Non-empty by construction.
        &self.0[0]
    }

    /// Consume the list and return its errors in order.
    pub fn into_vec(self) -> Vec<E> {
        self.0.into_vec()
    }
}

impl<E> Deref for FetchErrors<E> {
    type Target = [E];

    fn deref(&self) -> &[E] {
        &self.0
    }
}

impl<E> From<E> for FetchErrors<E> {
    fn from(error: E) -> Self {
        Self::one(error)
    }
}

impl<E: fmt::Debug> fmt::Debug for FetchErrors<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl<E: Serialize> Serialize for FetchErrors<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de, E: Deserialize<'de>> Deserialize<'de> for FetchErrors<E> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let errors = Vec::<E>::deserialize(deserializer)?;
        FetchErrors::new(errors).map_err(D::Error::custom)
    }
}

//! Poem payload and summary projection.
//!
//! The projector turns an optional [`Poem`] into a display string. It looks
//! only at the payload, not at how the loader got there, so it can be
//! re-run on every transition and always agrees with the current state.

use serde::{Deserialize, Serialize};

use crate::loader::Loader;

/// Placeholder shown when a poem has no verses.
pub const MISSING_VERSE: &str = "{missing}";

/// A titled sequence of verses, in the order they were supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Poem {
    pub title: String,
    pub verses: Vec<String>,
}

impl Poem {
    pub fn new<T, V, I>(title: T, verses: I) -> Self
    where
        T: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = V>,
    {
        Self {
            title: title.into(),
            verses: verses.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a poem from its JSON form: `{"title": ..., "verses": [...]}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The opening verse, if there is one.
    pub fn first_verse(&self) -> Option<&str> {
        self.verses.first().map(String::as_str)
    }
}

/// Display-ready projection of the current payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedPoem {
    pub summary: Option<String>,
}

impl MappedPoem {
    pub fn from_payload(poem: Option<&Poem>) -> Self {
        Self {
            summary: summarize(poem),
        }
    }

    /// Project whatever payload the loader currently holds.
    ///
    /// Pending and failed loaders have no payload and map to an empty summary.
    pub fn from_loader<E>(loader: &Loader<Poem, E>) -> Self {
        Self::from_payload(loader.payload())
    }
}

/// Summarize a poem as `"Title: {title} First verse: {verse}"`.
///
/// Returns `None` when there is no poem. A poem without verses uses
/// [`MISSING_VERSE`] in place of the first verse.
///
/// # Example
///
/// ```rust
/// use loadstate_core::poem::{summarize, Poem};
///
/// let poem = Poem::new("X", Vec::<String>::new());
/// assert_eq!(
///     summarize(Some(&poem)).as_deref(),
///     Some("Title: X First verse: {missing}")
/// );
/// assert_eq!(summarize(None), None);
/// ```
pub fn summarize(poem: Option<&Poem>) -> Option<String> {
    let poem = poem?;
    let verse = poem.first_verse().unwrap_or(MISSING_VERSE);
    Some(format!("Title: {} First verse: {}", poem.title, verse))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

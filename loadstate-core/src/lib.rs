//! Loadstate Core
//!
//! This crate provides a tri-state loader for asynchronously fetched data,
//! a pure projection from a fetched poem to a display string, and a small
//! observable store for wiring the two together.
//!
//! - `loader`: the [`Loader`](loader::Loader) sum type and its transitions
//! - `poem`: the [`Poem`](poem::Poem) payload and [`summarize`](poem::summarize)
//! - `store`: observable cells with computed values and watches
//! - `poem_store`: an explicit owner that fetches into a loader
//!
//! The loader and projector are plain data and a pure function. They take
//! no locks, spawn nothing and do not depend on the `store` module.
//!
//! With the `python` feature the crate also builds as a Python extension
//! module.
//!
//! # Example
//!
//! ```rust
//! use loadstate_core::poem::{MappedPoem, Poem};
//! use loadstate_core::poem_store::PoemStore;
//! use loadstate_core::store::Store;
//!
//! let poems: PoemStore = PoemStore::new();
//! let mapped = Store::new(MappedPoem::default());
//! let _watch = poems.project_into(&mapped);
//!
//! poems.start();
//! poems.succeed(Poem::new("X", ["a verse"]));
//!
//! assert_eq!(
//!     mapped.get().summary.as_deref(),
//!     Some("Title: X First verse: a verse")
//! );
//! ```

pub mod error;
pub mod loader;
pub mod poem;
pub mod poem_store;
pub mod store;

#[cfg(feature = "python")]
mod python;

pub use error::{LoaderError, Result};

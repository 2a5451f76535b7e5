//! Tri-state Loader
//!
//! A `Loader` caches the outcome of an asynchronous retrieval. At any moment
//! it is in exactly one of three shapes:
//!
//! - `Pending`: nothing has arrived yet. `loading` says whether a fetch is
//!   currently in flight.
//! - `Failed`: the last fetch failed with one or more errors.
//! - `Succeeded`: the last fetch produced a payload.
//!
//! # Transitions
//!
//! Every transition replaces the whole value, so the payload, the error list
//! and the `loading` flag always change together:
//!
//! ```text
//!   new() ──> Pending{loading: false}
//!   start() ──> Pending{loading: true}
//!   succeed(p) ──> Succeeded{payload: p}
//!   fail(e) ──> Failed{errors: e}        (e is never empty)
//!   reset() ──> Pending{loading: false}
//! ```
//!
//! A payload next to `loading = true`, a payload next to errors, or an empty
//! error list cannot be constructed.
//!
//! # Ownership
//!
//! The loader is plain data. Whoever performs the fetch owns it and issues
//! the transitions; everyone else reads. Concurrent writers must be
//! serialized by the owner (see [`crate::poem_store::PoemStore`]).

mod errors;
mod state;

pub use errors::FetchErrors;
pub use state::{Loader, LoaderPhase};

//! Observable Store
//!
//! A small, explicit observation layer for wiring a [`Loader`] to whatever
//! displays it. Nothing in the loader or the projector depends on this
//! module; it is one way of supplying the storage and change notification
//! those pieces expect from their owner.
//!
//! # Concepts
//!
//! ## Store
//!
//! A [`Store`] is a shared, mutable cell. Every write bumps the store's
//! version and notifies its subscribers with a snapshot of the new value.
//! Clones share the same cell. [`ReadStore`] is the read-only half, handed
//! out by owners that keep writes to themselves.
//!
//! ## Computed
//!
//! A [`Computed`] is a cached value derived from a store. It subscribes to
//! the store itself, so any write invalidates it. The value is recomputed
//! lazily, on the next read.
//!
//! ## Watch
//!
//! A [`Watch`] runs a callback with the store's value now and after every
//! write. It is the eager counterpart of `Computed`, used to push a
//! projection into another store. Snapshots older than the last one applied
//! are skipped, so the final run always sees the latest value.
//!
//! # Implementation Notes
//!
//! Derived values always observe the store as a whole and read it fresh on
//! each run. Values copied out of a store are plain data and do not update.
//!
//! [`Loader`]: crate::loader::Loader

mod cell;
mod computed;
mod subscriber;
mod watch;

pub use cell::{ReadStore, Store, StoreId};
pub use computed::{Computed, ComputedState};
pub use subscriber::SubscriberId;
pub use watch::Watch;

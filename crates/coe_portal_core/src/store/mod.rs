//! Client-side domain store.
//!
//! # Responsibility
//! - Own the papers/events/projects/users collections for one session.
//! - Apply local-only mutations directly and remote-confirmed mutations only
//!   after the action endpoint reports success.
//!
//! # Invariants
//! - Collections change only by whole-snapshot replacement; readers see a
//!   complete prior or next snapshot.
//! - New records are prepended.
//! - A failed remote-confirmed operation leaves every collection untouched.

pub mod domain_store;
pub mod operation;
pub mod seed;

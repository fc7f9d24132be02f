//! Portal domain model.
//!
//! # Responsibility
//! - Define the records held by the domain store (users, papers, events,
//!   projects) and their closed status vocabularies.
//! - Keep serialized field names aligned with the remote action API
//!   (`camelCase` fields, literal enum labels).
//!
//! # Invariants
//! - Ids are opaque strings, assigned once and never rewritten.
//! - Status/progress fields only hold values of their closed enums.

pub mod event;
pub mod paper;
pub mod project;
pub mod user;

/// Opaque identifier of a user record.
pub type UserId = String;

/// Opaque identifier of an owning unit (center of excellence).
pub type UnitId = String;

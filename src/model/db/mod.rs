//! DB-compatible (e.g. de/serialisable) types and the queries over them.
//!
//! The types in this module are serialised in a DB-friendly way, e.g.:
//!
//! - IDs and datetimes are serialised in MongoDB's own format.

pub mod candidate;
pub mod rating;
pub mod voter;

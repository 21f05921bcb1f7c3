//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in an DB-friendly way, e.g.:
//!
//! - Datetimes are serialised in MongoDB's own format.

mod vote;
pub use vote::VoteRecord;

mod voter;
pub use voter::Voter;

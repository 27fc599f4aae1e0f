//! Entity to model mappers
//!
//! - `TryFrom<Model> for Entity`: rows are re-validated on the way out
//! - `*Insert` structs: entity data prepared for binding

mod post;
mod vote;

pub use post::PostInsert;
pub use vote::{parse_stored_vote, records_from_lookup};

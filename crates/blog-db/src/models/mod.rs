//! Database models - SQLx-compatible structs for PostgreSQL tables

mod post;
mod vote;

pub use post::{CountersModel, PostModel};
pub use vote::VoteLookupModel;

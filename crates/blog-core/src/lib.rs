//! # blog-core
//!
//! Domain layer containing entities, value objects, the vote reconciler,
//! and the repository/ledger traits.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;
pub mod voting;

// Re-export commonly used types at crate root
pub use entities::{Post, PostVotes, VoteRecord, VoteTally, VoteType};
pub use error::DomainError;
pub use traits::{PostQuery, PostRepository, RepoResult, StorageHealth, VoteLedger};
pub use value_objects::{Snowflake, SnowflakeGenerator, SnowflakeParseError, UserId, UserIdError};
pub use voting::{current_vote, decide, decide_from_records, CounterDelta, Decision, VoteAction};

//! Repository implementations
//!
//! PostgreSQL implementations of the traits defined in blog-core.

mod error;
mod post;
mod vote_ledger;

pub use error::{map_db_error, map_ledger_error};
pub use post::PgPostRepository;
pub use vote_ledger::PgVoteLedger;

//! Repository and ledger traits

mod repositories;

pub use repositories::{PostQuery, PostRepository, RepoResult, StorageHealth, VoteLedger};

//! Domain entities - core business objects

mod post;
mod vote;

pub use post::Post;
pub use vote::{PostVotes, VoteRecord, VoteTally, VoteType};

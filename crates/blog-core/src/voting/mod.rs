//! Vote reconciliation

mod reconciler;

pub use reconciler::{current_vote, decide, decide_from_records, CounterDelta, Decision, VoteAction};

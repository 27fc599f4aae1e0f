//! Vote database model

use sqlx::FromRow;

/// A post row left-joined with the caller's vote rows.
///
/// A post without a matching vote yields one row with both vote columns
/// NULL; a missing post yields no rows at all.
#[derive(Debug, Clone, FromRow)]
pub struct VoteLookupModel {
    pub post_id: i64,
    pub user_id: Option<String>,
    pub vote_type: Option<String>,
}

//! Vote record mapper

use blog_core::{DomainError, Snowflake, UserId, VoteRecord, VoteType};

use crate::models::VoteLookupModel;

/// Turn the rows of a post/vote lookup into the caller's records.
///
/// No rows means the post does not exist.
pub fn records_from_lookup(
    post_id: Snowflake,
    rows: Vec<VoteLookupModel>,
) -> Result<Vec<VoteRecord>, DomainError> {
    if rows.is_empty() {
        return Err(DomainError::PostNotFound(post_id));
    }

    rows.into_iter()
        .filter_map(|row| match (row.user_id, row.vote_type) {
            (Some(user_id), Some(vote_type)) => Some((row.post_id, user_id, vote_type)),
            _ => None,
        })
        .map(|(post_id, user_id, vote_type)| {
            let user_id = UserId::new(user_id)
                .map_err(|e| DomainError::LedgerIntegrity(format!("stored user id: {e}")))?;
            let vote_type = parse_stored_vote(&vote_type)?;
            Ok(VoteRecord::new(Snowflake::new(post_id), user_id, vote_type))
        })
        .collect()
}

/// Parse a `vote_type` column; anything unknown means the ledger is corrupt
pub fn parse_stored_vote(raw: &str) -> Result<VoteType, DomainError> {
    raw.parse::<VoteType>()
        .map_err(|_| DomainError::LedgerIntegrity(format!("stored vote type {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(user: Option<&str>, vote: Option<&str>) -> VoteLookupModel {
        VoteLookupModel {
            post_id: 5,
            user_id: user.map(String::from),
            vote_type: vote.map(String::from),
        }
    }

    #[test]
    fn test_missing_post() {
        let err = records_from_lookup(Snowflake::new(5), vec![]).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_post_without_vote() {
        let records = records_from_lookup(Snowflake::new(5), vec![row(None, None)]).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_rows_become_records() {
        let records =
            records_from_lookup(Snowflake::new(5), vec![row(Some("u1"), Some("downvote"))]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].vote_type, VoteType::Downvote);
        assert_eq!(records[0].user_id.as_str(), "u1");
    }

    #[test]
    fn test_unknown_vote_type_is_integrity_error() {
        let err =
            records_from_lookup(Snowflake::new(5), vec![row(Some("u1"), Some("meh"))]).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_parse_stored_vote() {
        assert_eq!(parse_stored_vote("upvote").unwrap(), VoteType::Upvote);
        assert!(parse_stored_vote("").unwrap_err().is_conflict());
        assert!(parse_stored_vote("UPVOTE ").unwrap_err().is_conflict());
    }
}

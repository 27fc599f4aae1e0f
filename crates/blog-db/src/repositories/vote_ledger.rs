//! PostgreSQL implementation of VoteLedger
//!
//! `apply` runs in one transaction. The counter update goes first so the
//! post row is locked for the rest of the transaction; concurrent applies on
//! the same post queue behind it and see its committed result. The ledger
//! write is then guarded by the expected prior vote, and zero affected rows
//! means another request got there first.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument, warn};

use blog_core::entities::{VoteRecord, VoteTally, VoteType};
use blog_core::error::DomainError;
use blog_core::traits::{RepoResult, VoteLedger};
use blog_core::value_objects::{Snowflake, UserId};
use blog_core::voting::Decision;

use crate::mappers::{parse_stored_vote, records_from_lookup};
use crate::models::{CountersModel, VoteLookupModel};

use super::error::{map_db_error, map_ledger_error};

/// PostgreSQL implementation of VoteLedger
#[derive(Clone)]
pub struct PgVoteLedger {
    pool: PgPool,
}

impl PgVoteLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Conditional write of the `post_votes` row; returns affected rows
    async fn write_record(
        tx: &mut Transaction<'_, Postgres>,
        post_id: i64,
        user_id: &str,
        decision: Decision,
    ) -> RepoResult<u64> {
        let result = match decision {
            Decision::Insert(vote) => {
                sqlx::query(
                    r#"
                    INSERT INTO post_votes (post_id, user_id, vote_type)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (post_id, user_id) DO NOTHING
                    "#,
                )
                .bind(post_id)
                .bind(user_id)
                .bind(vote.as_str())
                .execute(&mut **tx)
                .await
            }
            Decision::Retract(vote) => {
                sqlx::query(
                    r#"
                    DELETE FROM post_votes
                    WHERE post_id = $1 AND user_id = $2 AND vote_type = $3
                    "#,
                )
                .bind(post_id)
                .bind(user_id)
                .bind(vote.as_str())
                .execute(&mut **tx)
                .await
            }
            Decision::Flip { from, to } => {
                sqlx::query(
                    r#"
                    UPDATE post_votes
                    SET vote_type = $4, updated_at = NOW()
                    WHERE post_id = $1 AND user_id = $2 AND vote_type = $3
                    "#,
                )
                .bind(post_id)
                .bind(user_id)
                .bind(from.as_str())
                .bind(to.as_str())
                .execute(&mut **tx)
                .await
            }
        }
        .map_err(map_ledger_error)?;

        Ok(result.rows_affected())
    }

    /// What is stored right now, for the conflict message
    async fn stored_vote(
        tx: &mut Transaction<'_, Postgres>,
        post_id: i64,
        user_id: &str,
    ) -> RepoResult<Option<VoteType>> {
        let stored = sqlx::query_scalar::<_, String>(
            r#"
            SELECT vote_type FROM post_votes WHERE post_id = $1 AND user_id = $2
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_db_error)?;

        stored.as_deref().map(parse_stored_vote).transpose()
    }
}

#[async_trait]
impl VoteLedger for PgVoteLedger {
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    async fn find_votes(&self, post_id: Snowflake, user_id: &UserId) -> RepoResult<Vec<VoteRecord>> {
        let rows = sqlx::query_as::<_, VoteLookupModel>(
            r#"
            SELECT p.id AS post_id, v.user_id, v.vote_type
            FROM posts p
            LEFT JOIN post_votes v ON v.post_id = p.id AND v.user_id = $2
            WHERE p.id = $1
            "#,
        )
        .bind(post_id.into_inner())
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        records_from_lookup(post_id, rows)
    }

    #[instrument(skip(self, user_id, decision), fields(user_id = %user_id, decision = %decision))]
    async fn apply(
        &self,
        post_id: Snowflake,
        user_id: &UserId,
        decision: Decision,
    ) -> RepoResult<VoteTally> {
        let delta = decision.delta();
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let counters = sqlx::query_as::<_, CountersModel>(
            r#"
            UPDATE posts
            SET upvote_count = upvote_count + $2,
                downvote_count = downvote_count + $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING upvote_count, downvote_count
            "#,
        )
        .bind(post_id.into_inner())
        .bind(delta.upvote)
        .bind(delta.downvote)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_ledger_error)?
        .ok_or(DomainError::PostNotFound(post_id))?;

        let affected =
            Self::write_record(&mut tx, post_id.into_inner(), user_id.as_str(), decision).await?;

        if affected != 1 {
            let stored = Self::stored_vote(&mut tx, post_id.into_inner(), user_id.as_str()).await?;
            warn!(%post_id, affected, "Stale vote decision, rolling back");
            // dropping `tx` rolls back the counter update
            return Err(DomainError::stale_vote(post_id, user_id, stored, decision));
        }

        tx.commit().await.map_err(map_db_error)?;

        debug!(
            %post_id,
            upvote_count = counters.upvote_count,
            downvote_count = counters.downvote_count,
            "Vote applied"
        );

        Ok(VoteTally {
            upvote_count: counters.upvote_count,
            downvote_count: counters.downvote_count,
            removed: decision.is_removal(),
        })
    }
}

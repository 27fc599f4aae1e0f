//! Vote service
//!
//! Casting runs read-decide-apply against the ledger. A conflicting apply
//! means someone else changed this user's vote in between; the whole round
//! is repeated with backoff until it lands or attempts run out. The whole
//! cast, retries included, is bounded by one deadline.

use blog_core::{current_vote, decide_from_records, Decision, Snowflake, UserId, VoteAction, VoteTally};
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use crate::dto::{MyVoteResponse, VoteRequest, VoteResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::retry::RetryPolicy;

/// Vote service
pub struct VoteService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> VoteService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Cast an upvote, toggling or flipping an existing vote
    pub async fn upvote(&self, post_id: Snowflake, user_id: &UserId) -> ServiceResult<VoteResponse> {
        self.cast(post_id, user_id, VoteAction::Upvote).await
    }

    /// Cast a downvote, toggling or flipping an existing vote
    pub async fn downvote(&self, post_id: Snowflake, user_id: &UserId) -> ServiceResult<VoteResponse> {
        self.cast(post_id, user_id, VoteAction::Downvote).await
    }

    /// Single-endpoint form: direction arrives as text
    pub async fn cast_request(&self, user_id: &UserId, request: VoteRequest) -> ServiceResult<VoteResponse> {
        let action = request.action()?;
        self.cast(request.post_id, user_id, action).await
    }

    /// Cast `action` on behalf of `user_id`
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn cast(
        &self,
        post_id: Snowflake,
        user_id: &UserId,
        action: VoteAction,
    ) -> ServiceResult<VoteResponse> {
        let policy = RetryPolicy::from(self.ctx.vote_config());
        let deadline = self.ctx.vote_config().apply_timeout();

        // dropping an in-flight round drops (rolls back) its transaction
        let rounds = policy.retry_when(ServiceError::is_retryable, |attempt| async move {
            if attempt > 0 {
                warn!(%post_id, attempt, "Vote conflicted, retrying");
            }
            self.attempt(post_id, user_id, action).await
        });

        let (decision, tally) = match timeout(deadline, rounds).await {
            Ok(result) => result.map_err(|e| match e {
                e if e.is_retryable() => ServiceError::conflict(format!(
                    "vote on post {post_id} still conflicting after {} attempts: {e}",
                    policy.max_attempts
                )),
                e => e,
            })?,
            Err(_) => {
                warn!(%post_id, deadline_ms = deadline.as_millis() as u64, "Vote timed out");
                return Err(ServiceError::Timeout(deadline));
            }
        };

        info!(
            %post_id,
            %decision,
            upvote_count = tally.upvote_count,
            downvote_count = tally.downvote_count,
            "Vote cast"
        );

        Ok(VoteResponse::from_tally(post_id, tally, decision.resulting()))
    }

    /// One read-decide-apply round
    async fn attempt(
        &self,
        post_id: Snowflake,
        user_id: &UserId,
        action: VoteAction,
    ) -> ServiceResult<(Decision, VoteTally)> {
        let ledger = self.ctx.vote_ledger();

        let records = ledger.find_votes(post_id, user_id).await?;
        let decision = decide_from_records(&records, user_id, action)?;
        let tally = ledger.apply(post_id, user_id, decision).await?;
        Ok((decision, tally))
    }

    /// The caller's current vote on a post
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn my_vote(&self, post_id: Snowflake, user_id: &UserId) -> ServiceResult<MyVoteResponse> {
        let records = self.ctx.vote_ledger().find_votes(post_id, user_id).await?;
        let vote = current_vote(&records, user_id)?;
        Ok(MyVoteResponse { post_id, vote })
    }
}

//! In-process storage
//!
//! Backs both [`PostRepository`] and [`VoteLedger`] with a `DashMap` of
//! per-post entries. Each entry sits behind its own mutex, so applies on one
//! post are serialized while different posts never contend.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, instrument};

use blog_core::entities::{Post, PostVotes, VoteRecord, VoteTally};
use blog_core::error::DomainError;
use blog_core::traits::{PostQuery, PostRepository, RepoResult, StorageHealth, VoteLedger};
use blog_core::value_objects::{Snowflake, UserId};
use blog_core::voting::Decision;

/// A post and its ledger; counters live in `votes`
#[derive(Debug)]
struct Entry {
    post: Post,
    votes: PostVotes,
}

impl Entry {
    fn snapshot(&self) -> Post {
        Post {
            upvote_count: self.votes.upvote_count(),
            downvote_count: self.votes.downvote_count(),
            ..self.post.clone()
        }
    }
}

fn snapshot(entry: &Mutex<Entry>) -> Post {
    entry.lock().snapshot()
}

/// Posts and votes held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    posts: Arc<DashMap<Snowflake, Arc<Mutex<Entry>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Clone the entry handle out so the map shard is not held while locking
    fn entry(&self, post_id: Snowflake) -> RepoResult<Arc<Mutex<Entry>>> {
        self.posts
            .get(&post_id)
            .map(|e| Arc::clone(e.value()))
            .ok_or(DomainError::PostNotFound(post_id))
    }

    /// Full ledger of a post, ordered by user id
    pub fn ledger(&self, post_id: Snowflake) -> RepoResult<Vec<VoteRecord>> {
        Ok(self.entry(post_id)?.lock().votes.records())
    }

    /// Check every post's counters against its records
    pub fn verify(&self) -> RepoResult<()> {
        let entries: Vec<_> = self.posts.iter().map(|e| Arc::clone(e.value())).collect();
        entries.iter().try_for_each(|entry| entry.lock().votes.verify())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Post>> {
        Ok(self
            .posts
            .get(&id)
            .map(|e| Arc::clone(e.value()))
            .map(|entry| snapshot(&entry)))
    }

    async fn list(&self, query: PostQuery) -> RepoResult<Vec<Post>> {
        let limit = query.limit.clamp(1, 100) as usize;

        let mut ids: Vec<Snowflake> = self
            .posts
            .iter()
            .map(|e| *e.key())
            .filter(|id| query.before.map_or(true, |before| *id < before))
            .collect();
        ids.sort_unstable_by(|a, b| b.cmp(a));
        ids.truncate(limit);

        // a post cannot vanish (there is no delete), but stay lenient
        Ok(ids
            .into_iter()
            .filter_map(|id| self.entry(id).ok())
            .map(|entry| snapshot(&entry))
            .collect())
    }

    #[instrument(skip(self, post), fields(post_id = %post.id))]
    async fn create(&self, post: &Post) -> RepoResult<()> {
        let entry = Entry {
            post: post.clone(),
            votes: PostVotes::new(post.id),
        };

        match self.posts.entry(post.id) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(DomainError::ValidationError(
                format!("post {} already exists", post.id),
            )),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(entry)));
                Ok(())
            }
        }
    }
}

#[async_trait]
impl VoteLedger for MemoryStore {
    async fn find_votes(&self, post_id: Snowflake, user_id: &UserId) -> RepoResult<Vec<VoteRecord>> {
        let entry = self.entry(post_id)?;
        let guard = entry.lock();
        Ok(guard
            .votes
            .current(user_id)
            .map(|vote| VoteRecord::new(post_id, user_id.clone(), vote))
            .into_iter()
            .collect())
    }

    #[instrument(skip(self, user_id, decision), fields(user_id = %user_id, decision = %decision))]
    async fn apply(
        &self,
        post_id: Snowflake,
        user_id: &UserId,
        decision: Decision,
    ) -> RepoResult<VoteTally> {
        let entry = self.entry(post_id)?;
        let mut guard = entry.lock();

        // PostVotes::apply re-checks the prior vote and leaves the entry
        // untouched on failure
        let tally = guard.votes.apply(user_id, decision)?;
        guard.post.updated_at = chrono::Utc::now();

        debug!(
            %post_id,
            upvote_count = tally.upvote_count,
            downvote_count = tally.downvote_count,
            "Vote applied"
        );
        Ok(tally)
    }
}

#[async_trait]
impl StorageHealth for MemoryStore {
    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }
}

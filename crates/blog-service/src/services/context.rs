//! Service context - dependency container for services

use std::sync::Arc;

use blog_common::{JwtService, VoteConfig};
use blog_core::traits::{PostRepository, StorageHealth, VoteLedger};
use blog_core::{Snowflake, SnowflakeGenerator};
use blog_db::MemoryStore;

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// Storage is reached only through the blog-core traits, so the same
/// services run over PostgreSQL or the in-memory store.
#[derive(Clone)]
pub struct ServiceContext {
    post_repo: Arc<dyn PostRepository>,
    vote_ledger: Arc<dyn VoteLedger>,
    storage_health: Arc<dyn StorageHealth>,
    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,
    vote_config: VoteConfig,
}

impl ServiceContext {
    pub fn new(
        post_repo: Arc<dyn PostRepository>,
        vote_ledger: Arc<dyn VoteLedger>,
        storage_health: Arc<dyn StorageHealth>,
        jwt_service: Arc<JwtService>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        vote_config: VoteConfig,
    ) -> Self {
        Self {
            post_repo,
            vote_ledger,
            storage_health,
            jwt_service,
            snowflake_generator,
            vote_config,
        }
    }

    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Storage ===

    pub fn post_repo(&self) -> &dyn PostRepository {
        self.post_repo.as_ref()
    }

    pub fn vote_ledger(&self) -> &dyn VoteLedger {
        self.vote_ledger.as_ref()
    }

    pub fn storage_health(&self) -> &dyn StorageHealth {
        self.storage_health.as_ref()
    }

    // === Services ===

    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    pub fn vote_config(&self) -> &VoteConfig {
        &self.vote_config
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("vote_config", &self.vote_config)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    post_repo: Option<Arc<dyn PostRepository>>,
    vote_ledger: Option<Arc<dyn VoteLedger>>,
    storage_health: Option<Arc<dyn StorageHealth>>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    vote_config: Option<VoteConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post_repo(mut self, repo: Arc<dyn PostRepository>) -> Self {
        self.post_repo = Some(repo);
        self
    }

    pub fn vote_ledger(mut self, ledger: Arc<dyn VoteLedger>) -> Self {
        self.vote_ledger = Some(ledger);
        self
    }

    pub fn storage_health(mut self, health: Arc<dyn StorageHealth>) -> Self {
        self.storage_health = Some(health);
        self
    }

    /// Use one in-memory store for posts, votes, and health
    pub fn memory_store(self, store: MemoryStore) -> Self {
        let store = Arc::new(store);
        self.post_repo(store.clone())
            .vote_ledger(store.clone())
            .storage_health(store)
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn vote_config(mut self, config: VoteConfig) -> Self {
        self.vote_config = Some(config);
        self
    }

    /// Build the ServiceContext
    ///
    /// The snowflake generator defaults to worker 0 and the vote settings to
    /// their defaults; everything else is required.
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let missing = |what: &str| ServiceError::internal(format!("{what} is required"));

        Ok(ServiceContext::new(
            self.post_repo.ok_or_else(|| missing("post_repo"))?,
            self.vote_ledger.ok_or_else(|| missing("vote_ledger"))?,
            self.storage_health.ok_or_else(|| missing("storage_health"))?,
            self.jwt_service.ok_or_else(|| missing("jwt_service"))?,
            self.snowflake_generator.unwrap_or_default(),
            self.vote_config.unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_storage() {
        let result = ServiceContextBuilder::new()
            .jwt_service(Arc::new(JwtService::new("secret", 60)))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_with_memory_store() {
        let ctx = ServiceContext::builder()
            .memory_store(MemoryStore::new())
            .jwt_service(Arc::new(JwtService::new("secret", 60)))
            .build()
            .unwrap();

        assert_eq!(ctx.vote_config().max_attempts, 3);
        assert_ne!(ctx.generate_id(), ctx.generate_id());
    }
}

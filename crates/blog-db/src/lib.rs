//! # blog-db
//!
//! Storage layer implementing the blog-core traits.
//!
//! - PostgreSQL via SQLx: pool management, migrations, `FromRow` models,
//!   entity mappers, [`PgPostRepository`] and the transactional
//!   [`PgVoteLedger`]
//! - [`MemoryStore`]: a process-local implementation of the same traits
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blog_db::{create_pool, PgVoteLedger, PoolOptions};
//!
//! async fn example(config: &blog_common::DatabaseConfig) -> Result<(), sqlx::Error> {
//!     let pool = create_pool(config, &PoolOptions::default()).await?;
//!     let ledger = PgVoteLedger::new(pool);
//!     // hand `ledger` to the service layer...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations, PgHealthCheck, PgPool, PoolOptions};
pub use repositories::{PgPostRepository, PgVoteLedger};

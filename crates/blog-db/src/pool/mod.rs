//! Database connection pool management

mod postgres;

pub use postgres::{create_pool, run_migrations, PgHealthCheck, PoolOptions};

// Re-export PgPool for convenience
pub use sqlx::postgres::PgPool;

//! # safechat-db
//!
//! Entity store implementing the repository traits from `safechat-core`.
//!
//! ## Overview
//!
//! - PostgreSQL via SQLx: connection pool, migrations, `FromRow` models,
//!   entity ↔ model mappers and repositories
//! - [`MemoryStore`]: an in-process store implementing the same traits,
//!   used when no database is configured and by tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use safechat_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use safechat_db::PgLinkRepository;
//! use safechat_core::traits::LinkRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::new("postgres://localhost/safechat")).await?;
//!     run_migrations(&pool).await?;
//!     let links = PgLinkRepository::new(pool);
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

pub use memory::{MemoryStore, StoreFault};
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{
    PgChatRepository, PgContactRepository, PgFlagRepository, PgLinkRepository,
    PgMessageRepository, PgUserRepository,
};

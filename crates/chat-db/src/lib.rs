//! # chat-db
//!
//! Persistence layer implementing the repository traits from `chat-core`.
//!
//! ## Overview
//!
//! - PostgreSQL repositories via SQLx, with an idempotent schema
//! - Database models with SQLx `FromRow` derives and entity mappers
//! - [`MemoryStore`], an in-process implementation of every repository trait
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chat_db::pool::{create_pool, run_migrations, PoolConfig};
//! use chat_db::PgMessageRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::new("postgres://localhost/chat")).await?;
//!     run_migrations(&pool).await?;
//!     let messages = PgMessageRepository::new(pool);
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
pub use pool::{create_pool, run_migrations, PgPool, PoolConfig};
pub use repositories::{PgContainerRepository, PgMessageRepository, PgProfileRepository};

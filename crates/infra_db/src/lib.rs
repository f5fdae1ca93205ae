//! Infrastructure Database Layer
//!
//! PostgreSQL storage for the club dues system, implementing the domain
//! port traits with SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: each repository holds a pool
//! clone, speaks plain SQL, and hides every database detail behind the
//! port traits defined by the domain crates. Due updates run under an
//! optimistic version check, and the payment repository persists a payment
//! together with its reconciled due in one transaction.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool_from_url, DueRepository};
//!
//! let pool = create_pool_from_url("postgres://localhost/club_dues").await?;
//! let dues = DueRepository::new(pool.clone());
//! ```

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
pub use repositories::{
    AttachmentRepository, ConfigRepository, DueRepository, PaymentRepository, PlayerRepository,
};

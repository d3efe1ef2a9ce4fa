//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories are thin translators between the internal row structs in
//! `models` and domain types; no business rules live here. Connections come
//! from a `bb8` pool driven by `diesel-async`, and every database failure is
//! mapped onto the owning port's error enum.
//!
//! ```ignore
//! use approvals::outbound::persistence::{DbPool, DieselRequestRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/approvals")).await?;
//! let requests = DieselRequestRepository::new(pool);
//! ```

mod diesel_request_repository;
mod diesel_user_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_request_repository::DieselRequestRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

//! # placehub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port trait defined in `placehub-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//! - Translate unique-index violations into validation errors
//! - Optionally seed a fresh database with demo places
//!
//! ## Dependency rule
//! Depends on `placehub-app` (for port traits) and `placehub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod place_repo;
mod pool;
pub mod seed;

pub use error::StorageError;
pub use place_repo::SqlitePlaceRepository;
pub use pool::{Config, Database};

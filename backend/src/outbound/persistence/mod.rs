//! PostgreSQL storage backend using Diesel.
//!
//! - **Thin adapter**: [`DieselStorage`] only translates between rows and
//!   domain types; authentication and labeling stay in the domain.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Async pooling**: `diesel-async` connections via `bb8`; migrations run
//!   on a blocking thread at initialisation.
//!
//! # Example
//!
//! ```no_run
//! use grouptrack::domain::ports::Storage;
//! use grouptrack::outbound::persistence::{DieselStorage, PoolConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = DieselStorage::connect(PoolConfig::new("postgres://localhost/grouptrack")).await?;
//! storage.initialize().await?;
//! # Ok(())
//! # }
//! ```

mod diesel_storage;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_storage::DieselStorage;
pub use migrations::{MIGRATIONS, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

//! SQLite backend for the Orbit relationship store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod repository;
mod schema;

pub mod error;

pub use error::{Error, Result};
pub use repository::SqliteRepository;
pub use schema::SCHEMA_VERSION;

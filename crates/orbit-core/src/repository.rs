//! The `RelationshipRepository` trait: persistence for the record store.
//!
//! The trait is implemented by storage backends (e.g. `orbit-store-sqlite`).
//! Hosts load the records once into a [`crate::store::RelationshipStore`],
//! run mutations in memory, and save each touched record afterwards.

use std::future::Future;

use uuid::Uuid;

use crate::relationship::RelationshipRecord;

/// Abstraction over a persistence backend for relationship records.
///
/// History is append-only on disk as well: saving a record never rewrites
/// entries that were saved before.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RelationshipRepository: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Load every record with its full history, in creation order.
  fn load_all(
    &self,
  ) -> impl Future<Output = Result<Vec<RelationshipRecord>, Self::Error>> + Send + '_;

  /// Insert or update a record and append any history entries not yet
  /// persisted.
  fn save<'a>(
    &'a self,
    record: &'a RelationshipRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete a record and its history. Returns `false` if it did not exist.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

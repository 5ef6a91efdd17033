//! The loaded store plus its backing database.

use std::path::Path;

use anyhow::{Context, Result, bail};
use orbit_core::{
  relationship::RelationshipRecord,
  repository::RelationshipRepository,
  store::RelationshipStore,
};
use orbit_store_sqlite::SqliteRepository;
use uuid::Uuid;

pub struct Session {
  pub store: RelationshipStore,
  repo:      SqliteRepository,
}

impl Session {
  pub async fn open(path: &Path) -> Result<Self> {
    let repo = SqliteRepository::open(path)
      .await
      .with_context(|| format!("opening store at {}", path.display()))?;
    let records = repo.load_all().await.context("loading relationships")?;
    tracing::debug!(count = records.len(), path = %path.display(), "store loaded");
    Ok(Self { store: RelationshipStore::from_records(records), repo })
  }

  /// Write the current state of `id` back to the database.
  pub async fn save(&self, id: Uuid) -> Result<&RelationshipRecord> {
    let record = self
      .store
      .get(id)
      .with_context(|| format!("relationship {id} vanished"))?;
    self.repo.save(record).await.context("saving relationship")?;
    Ok(record)
  }

  pub async fn forget(&mut self, id: Uuid) -> Result<RelationshipRecord> {
    let record = self
      .store
      .delete(id)
      .with_context(|| format!("relationship {id} not found"))?;
    self.repo.delete(id).await.context("deleting relationship")?;
    Ok(record)
  }

  /// Find a record by id, id prefix, or case-insensitive name.
  pub fn resolve(&self, who: &str) -> Result<Uuid> {
    resolve(self.store.list(), who)
  }
}

pub fn resolve(records: &[RelationshipRecord], who: &str) -> Result<Uuid> {
  if let Ok(id) = Uuid::parse_str(who) {
    return Ok(id);
  }

  let needle = who.trim().to_lowercase();
  let by_name: Vec<&RelationshipRecord> = records
    .iter()
    .filter(|r| r.name.to_lowercase() == needle)
    .collect();
  let matches = if by_name.is_empty() {
    records
      .iter()
      .filter(|r| !needle.is_empty() && r.id.to_string().starts_with(&needle))
      .collect()
  } else {
    by_name
  };

  match matches.as_slice() {
    [one] => Ok(one.id),
    [] => bail!("no relationship matches {who:?}"),
    many => bail!(
      "{who:?} is ambiguous ({} matches); use the id instead",
      many.len()
    ),
  }
}

//! [`SqliteRepository`], the SQLite implementation of
//! [`RelationshipRepository`].

use std::{collections::HashMap, path::Path};

use orbit_core::{
  history::HistoryEntry,
  relationship::RelationshipRecord,
  repository::RelationshipRepository,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{RawEntry, RawRelationship, encode_uuid},
  schema::{SCHEMA, SCHEMA_VERSION},
};

// ─── Repository ──────────────────────────────────────────────────────────────

/// Relationship persistence backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteRepository {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteRepository {
  /// Open (or create) a database at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let repo = Self { conn };
    repo.init_schema().await?;
    Ok(repo)
  }

  /// Open an in-memory database, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let repo = Self { conn };
    repo.init_schema().await?;
    Ok(repo)
  }

  /// The `user_version` stamped into the database.
  pub async fn schema_version(&self) -> Result<i64> {
    let version = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("PRAGMA user_version", [], |row| row.get::<_, i64>(0))?)
      })
      .await?;
    Ok(version)
  }

  async fn init_schema(&self) -> Result<()> {
    let found = self.schema_version().await?;
    if found > SCHEMA_VERSION {
      return Err(Error::UnsupportedSchema { found, supported: SCHEMA_VERSION });
    }

    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!(from = found, to = SCHEMA_VERSION, "schema initialised");
    Ok(())
  }
}

// ─── RelationshipRepository impl ─────────────────────────────────────────────

impl RelationshipRepository for SqliteRepository {
  type Error = Error;

  async fn load_all(&self) -> Result<Vec<RelationshipRecord>> {
    let (rows, entries): (Vec<RawRelationship>, Vec<RawEntry>) = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT relationship_id, created_at, name, role, kind, contact, avatar,
                  zone, temperature, last_interaction,
                  trust, communication, frequency, satisfaction, rqs_json
           FROM relationships
           ORDER BY created_at, rowid",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawRelationship {
              relationship_id:  row.get(0)?,
              created_at:       row.get(1)?,
              name:             row.get(2)?,
              role:             row.get(3)?,
              kind:             row.get(4)?,
              contact:          row.get(5)?,
              avatar:           row.get(6)?,
              zone:             row.get(7)?,
              temperature:      row.get(8)?,
              last_interaction: row.get(9)?,
              trust:            row.get(10)?,
              communication:    row.get(11)?,
              frequency:        row.get(12)?,
              satisfaction:     row.get(13)?,
              rqs_json:         row.get(14)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
          "SELECT entry_id, relationship_id, date, temperature,
                  oxytocin, cortisol, title, description, event
           FROM history
           ORDER BY date, rowid",
        )?;
        let entries = stmt
          .query_map([], |row| {
            Ok(RawEntry {
              entry_id:        row.get(0)?,
              relationship_id: row.get(1)?,
              date:            row.get(2)?,
              temperature:     row.get(3)?,
              oxytocin:        row.get(4)?,
              cortisol:        row.get(5)?,
              title:           row.get(6)?,
              description:     row.get(7)?,
              event:           row.get(8)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, entries))
      })
      .await?;

    let mut histories: HashMap<String, Vec<HistoryEntry>> = HashMap::new();
    for raw in entries {
      let owner = raw.relationship_id.clone();
      histories.entry(owner).or_default().push(raw.into_entry()?);
    }

    rows
      .into_iter()
      .map(|raw| {
        let history = histories.remove(&raw.relationship_id).unwrap_or_default();
        raw.into_record(history)
      })
      .collect()
  }

  async fn save(&self, record: &RelationshipRecord) -> Result<()> {
    let row = RawRelationship::from_record(record)?;
    let entries: Vec<RawEntry> = record
      .history
      .iter()
      .map(|e| RawEntry::from_entry(&row.relationship_id, e))
      .collect();
    let appended = entries.len();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Upsert rather than REPLACE: a REPLACE deletes the row first, which
        // would cascade to the history table.
        tx.execute(
          "INSERT INTO relationships (
             relationship_id, created_at, name, role, kind, contact, avatar,
             zone, temperature, last_interaction,
             trust, communication, frequency, satisfaction, rqs_json
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
           ON CONFLICT (relationship_id) DO UPDATE SET
             name             = excluded.name,
             role             = excluded.role,
             kind             = excluded.kind,
             contact          = excluded.contact,
             avatar           = excluded.avatar,
             zone             = excluded.zone,
             temperature      = excluded.temperature,
             last_interaction = excluded.last_interaction,
             trust            = excluded.trust,
             communication    = excluded.communication,
             frequency        = excluded.frequency,
             satisfaction     = excluded.satisfaction,
             rqs_json         = excluded.rqs_json",
          rusqlite::params![
            row.relationship_id,
            row.created_at,
            row.name,
            row.role,
            row.kind,
            row.contact,
            row.avatar,
            row.zone,
            row.temperature,
            row.last_interaction,
            row.trust,
            row.communication,
            row.frequency,
            row.satisfaction,
            row.rqs_json,
          ],
        )?;

        {
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO history (
               entry_id, relationship_id, date, temperature,
               oxytocin, cortisol, title, description, event
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          )?;
          for e in &entries {
            stmt.execute(rusqlite::params![
              e.entry_id,
              e.relationship_id,
              e.date,
              e.temperature,
              e.oxytocin,
              e.cortisol,
              e.title,
              e.description,
              e.event,
            ])?;
          }
        }

        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(id = %record.id, entries = appended, "saved relationship");
    Ok(())
  }

  async fn delete(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM relationships WHERE relationship_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }
}

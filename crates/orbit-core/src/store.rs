//! [`RelationshipStore`], the owned in-memory record store.
//!
//! The store is the single writer for relationship state. Hosts hold it by
//! value (or behind their own lock) and pass it to the engines by reference;
//! every mutation completes synchronously and returns the updated record.
//! Persistence is a separate concern, see [`crate::repository`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  history::{DEFAULT_TEMPERATURE, HistoryEntry, coerce_reading, coerce_temperature},
  relationship::{Metrics, NewRelationship, RelationshipPatch, RelationshipRecord},
  rqs::{RqsAssessment, RqsResult},
  zone::{RECLASSIFICATION_EVENT, Zone, ZoneVerdict, classify_metrics},
};

// ─── Mutation inputs ─────────────────────────────────────────────────────────

/// An ad-hoc interaction logged by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
  pub date:        DateTime<Utc>,
  /// Raw temperature as entered. Missing or invalid values become
  /// [`DEFAULT_TEMPERATURE`].
  #[serde(default)]
  pub temperature: Option<f64>,
  #[serde(default)]
  pub title:       Option<String>,
  #[serde(default)]
  pub description: Option<String>,
}

/// The output of a classification or grading run, applied as one unit.
///
/// Omitted fields keep the record's current value; the history entry falls
/// back to the previous entry's readings for them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Diagnosis {
  pub zone:        Option<Zone>,
  pub temperature: Option<u8>,
  pub oxytocin:    Option<u8>,
  pub cortisol:    Option<u8>,
  pub rqs:         Option<RqsResult>,
  pub event:       Option<String>,
}

impl From<ZoneVerdict> for Diagnosis {
  fn from(verdict: ZoneVerdict) -> Self {
    Self {
      zone: Some(verdict.zone),
      temperature: Some(verdict.temperature),
      event: Some(RECLASSIFICATION_EVENT.to_owned()),
      ..Self::default()
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipStore {
  records: Vec<RelationshipRecord>,
}

impl RelationshipStore {
  pub fn new() -> Self { Self::default() }

  /// Build a store from previously persisted records, keeping their order.
  pub fn from_records(records: Vec<RelationshipRecord>) -> Self {
    Self { records }
  }

  pub fn into_records(self) -> Vec<RelationshipRecord> { self.records }

  /// The whole store as a pretty-printed JSON array of records.
  pub fn to_json(&self) -> Result<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  /// Rebuild a store from the output of [`Self::to_json`]. Histories are
  /// re-sorted by date on the way in.
  pub fn from_json(json: &str) -> Result<Self> { Ok(serde_json::from_str(json)?) }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// All records, in insertion order.
  pub fn list(&self) -> &[RelationshipRecord] { &self.records }

  pub fn get(&self, id: Uuid) -> Option<&RelationshipRecord> {
    self.records.iter().find(|r| r.id == id)
  }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  fn get_mut(&mut self, id: Uuid) -> Result<&mut RelationshipRecord> {
    self
      .records
      .iter_mut()
      .find(|r| r.id == id)
      .ok_or(Error::RelationshipNotFound(id))
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Register a new relationship with mid-range metrics in zone 3.
  pub fn create(&mut self, input: NewRelationship) -> &RelationshipRecord {
    let record = RelationshipRecord {
      id:               Uuid::new_v4(),
      created_at:       Utc::now(),
      name:             input.name,
      role:             input.role,
      kind:             input.kind,
      contact:          input.contact.filter(|c| !c.is_empty()),
      avatar:           input.avatar.filter(|a| !a.is_empty()),
      zone:             Zone::Social,
      temperature:      DEFAULT_TEMPERATURE,
      last_interaction: None,
      metrics:          Metrics::default(),
      history:          Default::default(),
      rqs:              None,
    };
    tracing::debug!(id = %record.id, name = %record.name, "created relationship");
    self.records.push(record);
    &self.records[self.records.len() - 1]
  }

  /// Merge a partial patch into the record.
  pub fn update(
    &mut self,
    id: Uuid,
    patch: RelationshipPatch,
  ) -> Result<&RelationshipRecord> {
    let record = self.get_mut(id)?;
    record.merge(patch);
    tracing::debug!(%id, "updated relationship");
    Ok(record)
  }

  /// Remove a record together with its history.
  pub fn delete(&mut self, id: Uuid) -> Option<RelationshipRecord> {
    let at = self.records.iter().position(|r| r.id == id)?;
    tracing::debug!(%id, "deleted relationship");
    Some(self.records.remove(at))
  }

  /// Put back a record exactly as given, replacing any record with the same
  /// id. Used to undo a mutation whose write-through failed.
  pub fn restore(&mut self, record: RelationshipRecord) {
    match self.records.iter_mut().find(|r| r.id == record.id) {
      Some(slot) => *slot = record,
      None => {
        let at = self
          .records
          .partition_point(|r| r.created_at <= record.created_at);
        self.records.insert(at, record);
      }
    }
  }

  /// Append an interaction and make its temperature the current one.
  pub fn log_interaction(
    &mut self,
    id: Uuid,
    interaction: Interaction,
  ) -> Result<&RelationshipRecord> {
    let record = self.get_mut(id)?;
    let temperature = interaction
      .temperature
      .map(coerce_temperature)
      .unwrap_or(DEFAULT_TEMPERATURE);

    let mut entry = HistoryEntry::new(interaction.date, temperature);
    entry.title = interaction.title;
    entry.description = interaction.description;
    record.history.append(entry);

    record.temperature = temperature;
    record.last_interaction = Some(interaction.date.format("%Y-%m-%d").to_string());
    tracing::debug!(%id, temperature, "logged interaction");
    Ok(record)
  }

  /// Apply a classification or grading result and append exactly one history
  /// entry describing it.
  ///
  /// Readings outside 0–100 become [`DEFAULT_TEMPERATURE`]. The entry is dated
  /// now, or at the newest existing entry if that lies in the future, so it
  /// always lands last and its fallback readings come from the entry directly
  /// before it.
  pub fn apply_diagnosis(
    &mut self,
    id: Uuid,
    diagnosis: Diagnosis,
  ) -> Result<&RelationshipRecord> {
    let record = self.get_mut(id)?;
    let previous = record.history.last();
    let now = Utc::now();
    let date = previous.map_or(now, |e| e.date.max(now));

    let given = diagnosis.temperature.map(coerce_reading);
    let temperature = given
      .or(previous.map(|e| e.temperature))
      .unwrap_or(record.temperature);
    let oxytocin = diagnosis
      .oxytocin
      .map(coerce_reading)
      .or(previous.and_then(|e| e.oxytocin));
    let cortisol = diagnosis
      .cortisol
      .map(coerce_reading)
      .or(previous.and_then(|e| e.cortisol));

    if let Some(zone) = diagnosis.zone {
      record.zone = zone;
    }
    if let Some(t) = given {
      record.temperature = t;
    }
    if let Some(rqs) = diagnosis.rqs {
      record.rqs = Some(rqs);
    }

    let mut entry = HistoryEntry::new(date, temperature);
    entry.oxytocin = oxytocin;
    entry.cortisol = cortisol;
    entry.event = diagnosis.event;
    record.history.append(entry);

    tracing::debug!(
      %id,
      zone = record.zone.number(),
      temperature = record.temperature,
      "applied diagnosis"
    );
    Ok(record)
  }

  /// Re-derive the zone from the record's declared metrics.
  pub fn reclassify(&mut self, id: Uuid) -> Result<&RelationshipRecord> {
    let zone = classify_metrics(&self.get_mut(id)?.metrics);
    self.apply_diagnosis(id, Diagnosis {
      zone: Some(zone),
      event: Some(RECLASSIFICATION_EVENT.to_owned()),
      ..Diagnosis::default()
    })
  }

  /// Apply a completed checklist verdict.
  pub fn apply_checklist(
    &mut self,
    id: Uuid,
    verdict: ZoneVerdict,
  ) -> Result<&RelationshipRecord> {
    self.apply_diagnosis(id, verdict.into())
  }

  /// Apply a scored RQS questionnaire.
  pub fn apply_rqs(
    &mut self,
    id: Uuid,
    assessment: &RqsAssessment,
  ) -> Result<&RelationshipRecord> {
    self.apply_diagnosis(id, assessment.diagnosis())
  }
}

//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings so they sort
//! lexically. The RQS result is stored as compact JSON. UUIDs are stored as
//! hyphenated lowercase strings.

use std::str::FromStr as _;

use chrono::{DateTime, SecondsFormat, Utc};
use orbit_core::{
  history::{History, HistoryEntry},
  relationship::{Metrics, RelationshipKind, RelationshipRecord},
  rqs::RqsResult,
  zone::Zone,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── RelationshipKind ─────────────────────────────────────────────────────────

pub fn encode_kind(kind: RelationshipKind) -> String { kind.to_string() }

pub fn decode_kind(s: &str) -> Result<RelationshipKind> {
  RelationshipKind::from_str(s)
    .map_err(|_| Error::Decode(format!("unknown relationship kind: {s:?}")))
}

// ─── RqsResult ────────────────────────────────────────────────────────────────

pub fn encode_rqs(rqs: Option<&RqsResult>) -> Result<Option<String>> {
  Ok(rqs.map(serde_json::to_string).transpose()?)
}

pub fn decode_rqs(s: Option<&str>) -> Result<Option<RqsResult>> {
  Ok(s.map(serde_json::from_str).transpose()?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `relationships` row.
pub struct RawRelationship {
  pub relationship_id:  String,
  pub created_at:       String,
  pub name:             String,
  pub role:             String,
  pub kind:             String,
  pub contact:          Option<String>,
  pub avatar:           Option<String>,
  pub zone:             u8,
  pub temperature:      u8,
  pub last_interaction: Option<String>,
  pub trust:            u8,
  pub communication:    u8,
  pub frequency:        u8,
  pub satisfaction:     u8,
  pub rqs_json:         Option<String>,
}

impl RawRelationship {
  pub fn from_record(record: &RelationshipRecord) -> Result<Self> {
    Ok(Self {
      relationship_id:  encode_uuid(record.id),
      created_at:       encode_dt(record.created_at),
      name:             record.name.clone(),
      role:             record.role.clone(),
      kind:             encode_kind(record.kind),
      contact:          record.contact.clone(),
      avatar:           record.avatar.clone(),
      zone:             record.zone.number(),
      temperature:      record.temperature.min(100),
      last_interaction: record.last_interaction.clone(),
      trust:            record.metrics.trust,
      communication:    record.metrics.communication,
      frequency:        record.metrics.frequency,
      satisfaction:     record.metrics.satisfaction,
      rqs_json:         encode_rqs(record.rqs.as_ref())?,
    })
  }

  pub fn into_record(self, history: Vec<HistoryEntry>) -> Result<RelationshipRecord> {
    Ok(RelationshipRecord {
      id:               decode_uuid(&self.relationship_id)?,
      created_at:       decode_dt(&self.created_at)?,
      name:             self.name,
      role:             self.role,
      kind:             decode_kind(&self.kind)?,
      contact:          self.contact,
      avatar:           self.avatar,
      zone:             Zone::from_number(self.zone)?,
      temperature:      self.temperature,
      last_interaction: self.last_interaction,
      metrics:          Metrics {
        trust:         self.trust,
        communication: self.communication,
        frequency:     self.frequency,
        satisfaction:  self.satisfaction,
      },
      history:          History::from(history),
      rqs:              decode_rqs(self.rqs_json.as_deref())?,
    })
  }
}

/// Raw values read directly from a `history` row.
pub struct RawEntry {
  pub entry_id:        String,
  pub relationship_id: String,
  pub date:            String,
  pub temperature:     u8,
  pub oxytocin:        Option<u8>,
  pub cortisol:        Option<u8>,
  pub title:           Option<String>,
  pub description:     Option<String>,
  pub event:           Option<String>,
}

impl RawEntry {
  pub fn from_entry(relationship_id: &str, entry: &HistoryEntry) -> Self {
    Self {
      entry_id:        encode_uuid(entry.entry_id),
      relationship_id: relationship_id.to_owned(),
      date:            encode_dt(entry.date),
      temperature:     entry.temperature,
      oxytocin:        entry.oxytocin,
      cortisol:        entry.cortisol,
      title:           entry.title.clone(),
      description:     entry.description.clone(),
      event:           entry.event.clone(),
    }
  }

  pub fn into_entry(self) -> Result<HistoryEntry> {
    Ok(HistoryEntry {
      entry_id:    decode_uuid(&self.entry_id)?,
      date:        decode_dt(&self.date)?,
      temperature: self.temperature,
      oxytocin:    self.oxytocin,
      cortisol:    self.cortisol,
      title:       self.title,
      description: self.description,
      event:       self.event,
    })
  }
}

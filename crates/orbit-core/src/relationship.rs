//! The relationship record, the central entity of the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{
  history::{History, coerce_reading},
  rqs::RqsResult,
  zone::Zone,
};

/// Starting value for each declared metric on a new record.
pub const DEFAULT_METRIC: u8 = 50;

// ─── Kind ────────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString,
  EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RelationshipKind {
  Family,
  Work,
  Friend,
  Mentor,
  Partner,
  #[default]
  Other,
}

// ─── Metrics ─────────────────────────────────────────────────────────────────

/// The four self-declared 0–100 signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
  pub trust:         u8,
  pub communication: u8,
  pub frequency:     u8,
  pub satisfaction:  u8,
}

impl Default for Metrics {
  fn default() -> Self {
    Self {
      trust:         DEFAULT_METRIC,
      communication: DEFAULT_METRIC,
      frequency:     DEFAULT_METRIC,
      satisfaction:  DEFAULT_METRIC,
    }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
  pub id:               Uuid,
  pub created_at:       DateTime<Utc>,
  pub name:             String,
  /// Free-text role label, e.g. "older sister" or "team lead".
  pub role:             String,
  pub kind:             RelationshipKind,
  /// Reference to an address-book entry or phone number.
  pub contact:          Option<String>,
  pub avatar:           Option<String>,
  pub zone:             Zone,
  pub temperature:      u8,
  /// Human recency label for the latest logged interaction.
  pub last_interaction: Option<String>,
  pub metrics:          Metrics,
  pub history:          History,
  pub rqs:              Option<RqsResult>,
}

/// Input to [`crate::store::RelationshipStore::create`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRelationship {
  pub name:    String,
  #[serde(default)]
  pub kind:    RelationshipKind,
  #[serde(default)]
  pub role:    String,
  #[serde(default)]
  pub contact: Option<String>,
  #[serde(default)]
  pub avatar:  Option<String>,
}

impl NewRelationship {
  pub fn new(name: impl Into<String>, kind: RelationshipKind) -> Self {
    Self { name: name.into(), kind, ..Self::default() }
  }
}

/// A partial update. `None` leaves a field untouched; for `contact` and
/// `avatar`, an empty string clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipPatch {
  pub name:             Option<String>,
  pub role:             Option<String>,
  pub kind:             Option<RelationshipKind>,
  pub contact:          Option<String>,
  pub avatar:           Option<String>,
  pub zone:             Option<Zone>,
  pub temperature:      Option<u8>,
  pub last_interaction: Option<String>,
  pub trust:            Option<u8>,
  pub communication:    Option<u8>,
  pub frequency:        Option<u8>,
  pub satisfaction:     Option<u8>,
}

impl RelationshipRecord {
  /// Merge `patch` into this record. Numeric fields are clamped to 0–100.
  pub(crate) fn merge(&mut self, patch: RelationshipPatch) {
    fn clear_empty(value: String) -> Option<String> {
      (!value.is_empty()).then_some(value)
    }

    if let Some(name) = patch.name {
      self.name = name;
    }
    if let Some(role) = patch.role {
      self.role = role;
    }
    if let Some(kind) = patch.kind {
      self.kind = kind;
    }
    if let Some(contact) = patch.contact {
      self.contact = clear_empty(contact);
    }
    if let Some(avatar) = patch.avatar {
      self.avatar = clear_empty(avatar);
    }
    if let Some(zone) = patch.zone {
      self.zone = zone;
    }
    if let Some(temperature) = patch.temperature {
      self.temperature = coerce_reading(temperature);
    }
    if let Some(label) = patch.last_interaction {
      self.last_interaction = clear_empty(label);
    }

    let m = &mut self.metrics;
    for (slot, value) in [
      (&mut m.trust, patch.trust),
      (&mut m.communication, patch.communication),
      (&mut m.frequency, patch.frequency),
      (&mut m.satisfaction, patch.satisfaction),
    ] {
      if let Some(v) = value {
        *slot = v.min(100);
      }
    }
  }
}

//! Interaction history: the append-only timeline of a relationship.
//!
//! Entries are never edited once appended. Corrections are made by appending
//! a newer entry. The sequence is kept ascending by date at all times.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Temperature policy ──────────────────────────────────────────────────────

/// Substituted for any temperature input that is missing, non-numeric, or
/// outside 0–100.
pub const DEFAULT_TEMPERATURE: u8 = 50;

/// Round a raw temperature to an integer, falling back to
/// [`DEFAULT_TEMPERATURE`] when it is not a finite value in 0–100.
pub fn coerce_temperature(value: f64) -> u8 {
  let rounded = value.round();
  if rounded.is_finite() && (0.0..=100.0).contains(&rounded) {
    rounded as u8
  } else {
    tracing::warn!(value, "temperature out of range, using default");
    DEFAULT_TEMPERATURE
  }
}

/// Keep an integer reading (temperature or hormone level) that lies in
/// 0–100, otherwise fall back to [`DEFAULT_TEMPERATURE`].
pub fn coerce_reading(value: u8) -> u8 {
  if value <= 100 {
    value
  } else {
    tracing::warn!(value, "reading out of range, using default");
    DEFAULT_TEMPERATURE
  }
}

/// Parse a temperature from free text, e.g. a form field.
pub fn parse_temperature(raw: &str) -> u8 {
  match raw.trim().parse::<f64>() {
    Ok(value) => coerce_temperature(value),
    Err(_) => {
      tracing::warn!(raw, "temperature is not numeric, using default");
      DEFAULT_TEMPERATURE
    }
  }
}

// ─── Entry ───────────────────────────────────────────────────────────────────

/// A single point on a relationship's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub entry_id:    Uuid,
  pub date:        DateTime<Utc>,
  /// Temperature snapshot at `date`.
  pub temperature: u8,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub oxytocin:    Option<u8>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cortisol:    Option<u8>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  /// Label of the engine event that produced this entry, if any.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub event:       Option<String>,
}

impl HistoryEntry {
  /// An entry carrying only a date and temperature.
  pub fn new(date: DateTime<Utc>, temperature: u8) -> Self {
    Self {
      entry_id: Uuid::new_v4(),
      date,
      temperature: temperature.min(100),
      oxytocin: None,
      cortisol: None,
      title: None,
      description: None,
      event: None,
    }
  }
}

// ─── History ─────────────────────────────────────────────────────────────────

/// Date-ordered, append-only sequence of [`HistoryEntry`] values.
///
/// Deserialising re-sorts by date (stable), so persisted data that predates
/// the ordering guarantee is repaired on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<HistoryEntry>", into = "Vec<HistoryEntry>")]
pub struct History(Vec<HistoryEntry>);

impl History {
  pub fn new() -> Self { Self::default() }

  pub fn entries(&self) -> &[HistoryEntry] { &self.0 }

  pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> { self.0.iter() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// The entry with the latest date.
  pub fn last(&self) -> Option<&HistoryEntry> { self.0.last() }

  /// The `n` most recent entries, newest first.
  pub fn recent(&self, n: usize) -> Vec<&HistoryEntry> {
    self.0.iter().rev().take(n).collect()
  }

  /// Insert `entry` after every entry dated at or before it.
  pub(crate) fn append(&mut self, entry: HistoryEntry) -> &HistoryEntry {
    let at = self.0.partition_point(|e| e.date <= entry.date);
    self.0.insert(at, entry);
    &self.0[at]
  }
}

impl From<Vec<HistoryEntry>> for History {
  fn from(mut entries: Vec<HistoryEntry>) -> Self {
    entries.sort_by_key(|e| e.date);
    Self(entries)
  }
}

impl From<History> for Vec<HistoryEntry> {
  fn from(history: History) -> Self { history.0 }
}

impl<'a> IntoIterator for &'a History {
  type IntoIter = std::slice::Iter<'a, HistoryEntry>;
  type Item = &'a HistoryEntry;

  fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;

  fn at(day: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::days(day)
  }

  #[test]
  fn append_keeps_dates_ascending() {
    let mut history = History::new();
    history.append(HistoryEntry::new(at(1), 10));
    history.append(HistoryEntry::new(at(5), 50));
    history.append(HistoryEntry::new(at(3), 30));

    let temps: Vec<u8> = history.iter().map(|e| e.temperature).collect();
    assert_eq!(temps, vec![10, 30, 50]);
    assert_eq!(history.last().unwrap().temperature, 50);
  }

  #[test]
  fn equal_dates_keep_insertion_order() {
    let mut history = History::new();
    history.append(HistoryEntry::new(at(2), 1));
    history.append(HistoryEntry::new(at(2), 2));
    history.append(HistoryEntry::new(at(2), 3));

    let temps: Vec<u8> = history.iter().map(|e| e.temperature).collect();
    assert_eq!(temps, vec![1, 2, 3]);
  }

  #[test]
  fn recent_is_newest_first() {
    let history = History::from(vec![
      HistoryEntry::new(at(1), 10),
      HistoryEntry::new(at(2), 20),
      HistoryEntry::new(at(3), 30),
    ]);
    let recent: Vec<u8> = history.recent(2).iter().map(|e| e.temperature).collect();
    assert_eq!(recent, vec![30, 20]);
    assert_eq!(history.recent(10).len(), 3);
  }

  #[test]
  fn deserialising_sorts_by_date() {
    let unsorted = vec![HistoryEntry::new(at(9), 90), HistoryEntry::new(at(1), 10)];
    let json = serde_json::to_string(&unsorted).unwrap();
    let history: History = serde_json::from_str(&json).unwrap();
    assert_eq!(history.entries()[0].temperature, 10);
    assert_eq!(history.entries()[1].temperature, 90);
  }

  #[test]
  fn temperature_coercion_policy() {
    assert_eq!(coerce_temperature(72.4), 72);
    assert_eq!(coerce_temperature(72.5), 73);
    assert_eq!(coerce_temperature(0.0), 0);
    assert_eq!(coerce_temperature(100.0), 100);
    assert_eq!(coerce_temperature(f64::NAN), DEFAULT_TEMPERATURE);
    assert_eq!(coerce_temperature(f64::INFINITY), DEFAULT_TEMPERATURE);
    assert_eq!(coerce_temperature(140.0), DEFAULT_TEMPERATURE);
    assert_eq!(coerce_temperature(-3.0), DEFAULT_TEMPERATURE);
  }

  #[test]
  fn integer_readings_fall_back_instead_of_clamping() {
    assert_eq!(coerce_reading(0), 0);
    assert_eq!(coerce_reading(100), 100);
    assert_eq!(coerce_reading(101), DEFAULT_TEMPERATURE);
    assert_eq!(coerce_reading(255), DEFAULT_TEMPERATURE);
  }

  #[test]
  fn parse_temperature_falls_back_on_garbage() {
    assert_eq!(parse_temperature(" 64 "), 64);
    assert_eq!(parse_temperature("warm"), DEFAULT_TEMPERATURE);
    assert_eq!(parse_temperature(""), DEFAULT_TEMPERATURE);
  }
}

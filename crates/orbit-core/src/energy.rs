//! Energy distribution and stability across the five zones.
//!
//! A zone's energy is its share of the summed temperature of every record.
//! Stability measures how far that distribution sits from the configured
//! ideal points.

use serde::Serialize;
use strum::Display;

use crate::{relationship::RelationshipRecord, zone::Zone};

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Target band for one zone, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoneTarget {
  pub min:   u8,
  pub max:   u8,
  pub ideal: u8,
}

/// Static target bands, indexed by [`Zone::index`]. Ideal points sum to 100.
pub const ZONE_TARGETS: [ZoneTarget; 5] = [
  ZoneTarget { min: 15, max: 25, ideal: 20 },
  ZoneTarget { min: 15, max: 30, ideal: 20 },
  ZoneTarget { min: 15, max: 30, ideal: 20 },
  ZoneTarget { min: 10, max: 25, ideal: 20 },
  ZoneTarget { min: 5, max: 25, ideal: 20 },
];

/// Reported when the summed temperature is zero.
pub const FALLBACK_DISTRIBUTION: [u8; 5] = [15, 25, 30, 20, 10];

pub const OPTIMAL_THRESHOLD: u8 = 85;
pub const GOOD_THRESHOLD: u8 = 60;
pub const CAUTION_THRESHOLD: u8 = 40;

// ─── Report types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StabilityStatus {
  Optimal,
  Good,
  Caution,
  Critical,
}

impl StabilityStatus {
  pub fn from_score(score: u8) -> Self {
    if score >= OPTIMAL_THRESHOLD {
      Self::Optimal
    } else if score >= GOOD_THRESHOLD {
      Self::Good
    } else if score >= CAUTION_THRESHOLD {
      Self::Caution
    } else {
      Self::Critical
    }
  }
}

/// Where a zone's actual share sits relative to its band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BandPosition {
  Under,
  Within,
  Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoneEnergy {
  pub zone:     Zone,
  pub percent:  u8,
  pub count:    usize,
  pub target:   ZoneTarget,
  pub position: BandPosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnergyReport {
  pub zones:     [ZoneEnergy; 5],
  pub stability: u8,
  pub status:    StabilityStatus,
  /// `true` when [`FALLBACK_DISTRIBUTION`] stands in for real data.
  pub fallback:  bool,
}

impl EnergyReport {
  pub fn zone(&self, zone: Zone) -> &ZoneEnergy { &self.zones[zone.index()] }

  /// Whether the record's zone lies outside its target band.
  pub fn is_imbalanced(&self, record: &RelationshipRecord) -> bool {
    self.zone(record.zone).position != BandPosition::Within
  }

  /// The records whose zones are out of band, in input order.
  pub fn imbalanced<'a>(
    &self,
    records: &'a [RelationshipRecord],
  ) -> Vec<&'a RelationshipRecord> {
    records.iter().filter(|r| self.is_imbalanced(r)).collect()
  }
}

// ─── Computation ─────────────────────────────────────────────────────────────

/// Per-zone energy percentages and member counts. The boolean is `true` when
/// the fallback distribution was used.
///
/// Percentages are rounded independently and may not sum to exactly 100.
pub fn distribution(records: &[RelationshipRecord]) -> ([u8; 5], [usize; 5], bool) {
  let mut sums = [0u64; 5];
  let mut counts = [0usize; 5];
  for record in records {
    let i = record.zone.index();
    sums[i] += u64::from(record.temperature);
    counts[i] += 1;
  }

  let total: u64 = sums.iter().sum();
  if total == 0 {
    return (FALLBACK_DISTRIBUTION, counts, true);
  }

  let percents =
    sums.map(|s| (s as f64 / total as f64 * 100.0).round() as u8);
  (percents, counts, false)
}

/// `max(0, 100 - Σ|actual - ideal|)` over the five zones.
pub fn stability_score(percents: &[u8; 5]) -> u8 {
  let deviation: u32 = percents
    .iter()
    .zip(ZONE_TARGETS.iter())
    .map(|(&actual, target)| u32::from(actual.abs_diff(target.ideal)))
    .sum();
  100u32.saturating_sub(deviation) as u8
}

fn position(percent: u8, target: &ZoneTarget) -> BandPosition {
  if percent < target.min {
    BandPosition::Under
  } else if percent > target.max {
    BandPosition::Over
  } else {
    BandPosition::Within
  }
}

/// Compute the full energy report for a set of records.
pub fn analyze(records: &[RelationshipRecord]) -> EnergyReport {
  let (percents, counts, fallback) = distribution(records);
  let stability = stability_score(&percents);

  let zones = std::array::from_fn(|i| {
    let target = ZONE_TARGETS[i];
    ZoneEnergy {
      zone: Zone::ALL[i],
      percent: percents[i],
      count: counts[i],
      target,
      position: position(percents[i], &target),
    }
  });

  EnergyReport {
    zones,
    stability,
    status: StabilityStatus::from_score(stability),
    fallback,
  }
}

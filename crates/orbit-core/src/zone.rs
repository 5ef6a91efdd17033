//! Zones and the two paths that assign them.
//!
//! A zone is a 1–5 closeness ranking, 1 being closest. Zones are assigned
//! either from a relationship's declared [`Metrics`] or from the staged
//! yes/no [`CHECKLIST`]. Only the checklist can reach [`Zone::Background`].

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::{Error, Result, relationship::Metrics};

/// Event label attached to history entries written by either classification
/// path.
pub const RECLASSIFICATION_EVENT: &str = "zone re-classification";

/// Temperature assigned when every checklist question is answered "no".
pub const ALL_NO_TEMPERATURE: u8 = 0;

// ─── Zone ────────────────────────────────────────────────────────────────────

/// Psychological closeness of a relationship. Serialised as its number.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
  EnumIter, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Zone {
  Core = 1,
  Close = 2,
  #[default]
  Social = 3,
  Distant = 4,
  /// Background noise; reachable only through the checklist.
  Background = 5,
}

impl Zone {
  pub const ALL: [Zone; 5] = [
    Zone::Core,
    Zone::Close,
    Zone::Social,
    Zone::Distant,
    Zone::Background,
  ];

  pub fn number(self) -> u8 { self as u8 }

  /// Zero-based position, for indexing per-zone arrays.
  pub fn index(self) -> usize { self as usize - 1 }

  pub fn from_number(n: u8) -> Result<Self> {
    match n {
      1 => Ok(Self::Core),
      2 => Ok(Self::Close),
      3 => Ok(Self::Social),
      4 => Ok(Self::Distant),
      5 => Ok(Self::Background),
      other => Err(Error::InvalidZone(other)),
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Core => "core",
      Self::Close => "close",
      Self::Social => "social",
      Self::Distant => "distant",
      Self::Background => "background",
    }
  }
}

impl TryFrom<u8> for Zone {
  type Error = Error;

  fn try_from(n: u8) -> Result<Self> { Self::from_number(n) }
}

impl From<Zone> for u8 {
  fn from(zone: Zone) -> u8 { zone.number() }
}

impl fmt::Display for Zone {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({})", self.number(), self.label())
  }
}

/// Fixed temperature a checklist verdict assigns to each zone.
pub fn zone_temperature(zone: Zone) -> u8 {
  match zone {
    Zone::Core => 98,
    Zone::Close => 85,
    Zone::Social => 60,
    Zone::Distant => 30,
    Zone::Background => 5,
  }
}

// ─── Metrics path ────────────────────────────────────────────────────────────

/// Classify from declared metrics. Never returns [`Zone::Background`].
pub fn classify_metrics(metrics: &Metrics) -> Zone {
  let average = (f64::from(metrics.trust)
    + f64::from(metrics.communication)
    + f64::from(metrics.satisfaction))
    / 3.0;
  let frequency = metrics.frequency;

  if average > 85.0 && frequency > 70 {
    Zone::Core
  } else if average > 60.0 && frequency > 40 {
    Zone::Close
  } else if average > 30.0 {
    Zone::Social
  } else {
    Zone::Distant
  }
}

// ─── Checklist path ──────────────────────────────────────────────────────────

/// The ordered phases the checklist walks through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
  Reliance,
  Intimacy,
  Presence,
  Distance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
  pub phase:  Phase,
  pub prompt: &'static str,
  pub target: Zone,
}

/// The ten staged questions, in the order they are asked.
pub static CHECKLIST: [ChecklistItem; 10] = [
  ChecklistItem {
    phase:  Phase::Reliance,
    prompt: "Would this person be your first call in a real emergency?",
    target: Zone::Core,
  },
  ChecklistItem {
    phase:  Phase::Reliance,
    prompt: "Could you tell them something you have told no one else?",
    target: Zone::Core,
  },
  ChecklistItem {
    phase:  Phase::Intimacy,
    prompt: "Do you feel fully yourself around them, without performing?",
    target: Zone::Close,
  },
  ChecklistItem {
    phase:  Phase::Intimacy,
    prompt: "Would you clearly miss them if they moved away tomorrow?",
    target: Zone::Close,
  },
  ChecklistItem {
    phase:  Phase::Presence,
    prompt: "Do you seek out their company when you have free time?",
    target: Zone::Social,
  },
  ChecklistItem {
    phase:  Phase::Presence,
    prompt: "Do you enjoy seeing them when you meet in a group?",
    target: Zone::Social,
  },
  ChecklistItem {
    phase:  Phase::Distance,
    prompt: "Do you mostly meet because of work, family or circumstance?",
    target: Zone::Distant,
  },
  ChecklistItem {
    phase:  Phase::Distance,
    prompt: "Do you keep in touch out of habit or courtesy more than desire?",
    target: Zone::Distant,
  },
  ChecklistItem {
    phase:  Phase::Distance,
    prompt: "Do you mainly know them through occasional updates or news?",
    target: Zone::Background,
  },
  ChecklistItem {
    phase:  Phase::Distance,
    prompt: "Would you struggle to remember when you last spoke?",
    target: Zone::Background,
  },
];

/// The outcome of a completed checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneVerdict {
  pub zone:        Zone,
  pub temperature: u8,
  /// Zero-based index of the question answered "yes", or `None` when every
  /// answer was "no".
  pub question:    Option<usize>,
}

/// What the host should show after an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecklistStep {
  Ask(&'static ChecklistItem),
  Done(ZoneVerdict),
}

/// Incremental driver for the checklist: the first "yes" ends it.
#[derive(Debug, Clone, Default)]
pub struct ChecklistSession {
  index:   usize,
  verdict: Option<ZoneVerdict>,
}

impl ChecklistSession {
  pub fn new() -> Self { Self::default() }

  /// Zero-based index of the question currently awaiting an answer.
  pub fn index(&self) -> usize { self.index }

  pub fn current(&self) -> Option<&'static ChecklistItem> {
    if self.verdict.is_some() {
      return None;
    }
    CHECKLIST.get(self.index)
  }

  pub fn verdict(&self) -> Option<ZoneVerdict> { self.verdict }

  /// Record an answer for the current question. Answers arriving after the
  /// verdict are ignored and the verdict is returned again.
  pub fn answer(&mut self, yes: bool) -> ChecklistStep {
    if let Some(verdict) = self.verdict {
      return ChecklistStep::Done(verdict);
    }

    if yes {
      let zone = CHECKLIST[self.index].target;
      let verdict = ZoneVerdict {
        zone,
        temperature: zone_temperature(zone),
        question: Some(self.index),
      };
      self.verdict = Some(verdict);
      return ChecklistStep::Done(verdict);
    }

    self.index += 1;
    match CHECKLIST.get(self.index) {
      Some(item) => ChecklistStep::Ask(item),
      None => {
        let verdict = ZoneVerdict {
          zone:        Zone::Background,
          temperature: ALL_NO_TEMPERATURE,
          question:    None,
        };
        self.verdict = Some(verdict);
        ChecklistStep::Done(verdict)
      }
    }
  }
}

/// Run a whole answer sequence through a fresh session. Returns `None` if the
/// sequence ends before a verdict is reached.
pub fn classify_checklist(
  answers: impl IntoIterator<Item = bool>,
) -> Option<ZoneVerdict> {
  let mut session = ChecklistSession::new();
  for yes in answers {
    if let ChecklistStep::Done(verdict) = session.answer(yes) {
      return Some(verdict);
    }
  }
  None
}

#[cfg(test)]
mod tests {
  use super::*;

  fn metrics(trust: u8, communication: u8, frequency: u8, satisfaction: u8) -> Metrics {
    Metrics { trust, communication, frequency, satisfaction }
  }

  #[test]
  fn metrics_path_never_reaches_background() {
    for t in (0..=100).step_by(5) {
      for c in (0..=100).step_by(5) {
        for f in (0..=100).step_by(5) {
          for s in (0..=100).step_by(5) {
            let zone = classify_metrics(&metrics(t, c, f, s));
            assert_ne!(zone, Zone::Background, "({t},{c},{f},{s})");
          }
        }
      }
    }
  }

  #[test]
  fn metrics_thresholds_are_strict() {
    assert_eq!(classify_metrics(&metrics(90, 90, 80, 90)), Zone::Core);
    // Average exactly 85 does not qualify for zone 1.
    assert_eq!(classify_metrics(&metrics(85, 85, 80, 85)), Zone::Close);
    // Frequency exactly 70 does not qualify either.
    assert_eq!(classify_metrics(&metrics(90, 90, 70, 90)), Zone::Close);
    assert_eq!(classify_metrics(&metrics(61, 61, 41, 61)), Zone::Close);
    assert_eq!(classify_metrics(&metrics(61, 61, 40, 61)), Zone::Social);
    assert_eq!(classify_metrics(&metrics(31, 31, 0, 31)), Zone::Social);
    assert_eq!(classify_metrics(&metrics(30, 30, 100, 30)), Zone::Distant);
    assert_eq!(classify_metrics(&metrics(0, 0, 0, 0)), Zone::Distant);
  }

  #[test]
  fn default_metrics_land_in_social() {
    assert_eq!(classify_metrics(&Metrics::default()), Zone::Social);
  }

  #[test]
  fn first_yes_assigns_that_items_zone() {
    for (i, item) in CHECKLIST.iter().enumerate() {
      let answers = (0..CHECKLIST.len()).map(|j| j == i);
      let verdict = classify_checklist(answers).unwrap();
      assert_eq!(verdict.zone, item.target);
      assert_eq!(verdict.temperature, zone_temperature(item.target));
      assert_eq!(verdict.question, Some(i));
    }
  }

  #[test]
  fn all_no_yields_background_at_zero() {
    let verdict = classify_checklist([false; 10]).unwrap();
    assert_eq!(verdict.zone, Zone::Background);
    assert_eq!(verdict.temperature, 0);
    assert_eq!(verdict.question, None);
  }

  #[test]
  fn seventh_question_yes_is_distant() {
    let answers = (1..=10).map(|n| n == 7);
    let verdict = classify_checklist(answers).unwrap();
    assert_eq!(verdict.zone, Zone::Distant);
    assert_eq!(verdict.temperature, 30);
  }

  #[test]
  fn short_sequence_has_no_verdict() {
    assert!(classify_checklist([false, false, false]).is_none());
  }

  #[test]
  fn session_stops_asking_after_first_yes() {
    let mut session = ChecklistSession::new();
    assert_eq!(session.current(), Some(&CHECKLIST[0]));
    assert_eq!(session.answer(false), ChecklistStep::Ask(&CHECKLIST[1]));
    let step = session.answer(true);
    assert!(matches!(step, ChecklistStep::Done(v) if v.zone == Zone::Core));
    assert!(session.current().is_none());
    // Later answers do not change the verdict.
    assert_eq!(session.answer(true), step);
  }

  #[test]
  fn phases_are_in_order() {
    let phases: Vec<Phase> = CHECKLIST.iter().map(|i| i.phase).collect();
    let mut sorted = phases.clone();
    sorted.sort_by_key(|p| *p as u8);
    assert_eq!(phases, sorted);
  }

  #[test]
  fn zone_round_trips_through_its_number() {
    for zone in Zone::ALL {
      assert_eq!(Zone::from_number(zone.number()).unwrap(), zone);
    }
    assert!(matches!(Zone::from_number(0), Err(Error::InvalidZone(0))));
    assert!(matches!(Zone::from_number(6), Err(Error::InvalidZone(6))));
    assert_eq!(serde_json::to_string(&Zone::Distant).unwrap(), "4");
    assert!(serde_json::from_str::<Zone>("9").is_err());
  }
}

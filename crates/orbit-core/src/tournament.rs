//! Pairwise pick rounds and the "lean pattern" read from their winners.
//!
//! Candidates are paired in list order (0–1, 2–3, …) and the host submits the
//! winner of each pairing. Winners accumulate in pick order; no global
//! ranking is computed, so "rank" is only the order in which winners were
//! picked. An odd last candidate is never compared.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{Error, Result, relationship::RelationshipRecord, zone::Zone};

/// Share of winners one zone must hold to define the pattern.
pub const DOMINANCE_RATIO: f64 = 0.7;

/// Candidate count used when the host does not choose one.
pub const DEFAULT_BRACKET_SIZE: usize = 8;

// ─── Lens ────────────────────────────────────────────────────────────────────

/// The question framing a tournament. Affects candidate ordering and, for
/// the negative and frequency lenses, the resulting pattern.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, EnumIter,
  Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Lens {
  #[default]
  None,
  Positive,
  Negative,
  Frequency,
}

// ─── Pattern ─────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Pattern {
  Boundaries,
  Efficiency,
  Stability,
  Growth,
  Expansion,
  Vitality,
  Harmony,
}

impl Pattern {
  pub fn insight(self) -> &'static str {
    match self {
      Self::Boundaries => {
        "The people who weigh on you stand out clearly. Naming them is the \
         first step toward protecting your energy."
      }
      Self::Efficiency => {
        "Your picks follow who you see most. Check whether time spent matches \
         the people you value most."
      }
      Self::Stability => {
        "You lean on your innermost circle. Your wellbeing rests on a few deep, \
         steady bonds."
      }
      Self::Growth => {
        "Close friends and confidants lead your picks. You draw energy from \
         people who know you well and push you forward."
      }
      Self::Expansion => {
        "Your choices reach toward the edges of your network. New or distant \
         connections are pulling at your attention."
      }
      Self::Vitality => {
        "Your social circle carries your energy. Shared activities and \
         everyday company keep you going."
      }
      Self::Harmony => {
        "Your picks are spread across every zone. You keep a balanced mix of \
         closeness and breadth."
      }
    }
  }
}

// ─── Candidates ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
  pub id:   Uuid,
  pub name: String,
  pub zone: Zone,
}

impl From<&RelationshipRecord> for Candidate {
  fn from(record: &RelationshipRecord) -> Self {
    Self { id: record.id, name: record.name.clone(), zone: record.zone }
  }
}

/// Order records for `lens` and take the first `size` as candidates.
///
/// Positive puts the warmest first, negative the coldest, frequency the most
/// frequently seen; no lens keeps store order. Sorting is stable.
pub fn select_candidates(
  records: &[RelationshipRecord],
  lens: Lens,
  size: usize,
) -> Vec<Candidate> {
  let mut ordered: Vec<&RelationshipRecord> = records.iter().collect();
  match lens {
    Lens::None => {}
    Lens::Positive => ordered.sort_by(|a, b| b.temperature.cmp(&a.temperature)),
    Lens::Negative => ordered.sort_by_key(|r| r.temperature),
    Lens::Frequency => {
      ordered.sort_by(|a, b| b.metrics.frequency.cmp(&a.metrics.frequency))
    }
  }
  ordered.into_iter().take(size).map(Candidate::from).collect()
}

/// Read the lean pattern from a final winner list.
pub fn classify_pattern(winners: &[Candidate], lens: Lens) -> Pattern {
  match lens {
    Lens::Negative => return Pattern::Boundaries,
    Lens::Frequency => return Pattern::Efficiency,
    Lens::None | Lens::Positive => {}
  }

  let mut counts = [0usize; 5];
  for winner in winners {
    counts[winner.zone.index()] += 1;
  }
  // Ties go to the closer zone.
  let Some((index, &count)) = counts
    .iter()
    .enumerate()
    .rev()
    .max_by_key(|&(_, c)| *c)
    .filter(|&(_, c)| *c > 0)
  else {
    return Pattern::Harmony;
  };

  if (count as f64) < DOMINANCE_RATIO * winners.len() as f64 {
    return Pattern::Harmony;
  }
  match Zone::ALL[index] {
    Zone::Core => Pattern::Stability,
    Zone::Close => Pattern::Growth,
    Zone::Distant | Zone::Background => Pattern::Expansion,
    Zone::Social => Pattern::Vitality,
  }
}

// ─── Tournament ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TournamentOutcome {
  /// Winners in pick order.
  pub winners: Vec<Candidate>,
  pub pattern: Pattern,
  pub insight: &'static str,
}

/// A serialisable view of a tournament in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TournamentState {
  pub lens:     Lens,
  /// Zero-based index of the current pairing.
  pub pairing:  usize,
  pub rounds:   usize,
  pub current:  Option<(Candidate, Candidate)>,
  pub winners:  Vec<Candidate>,
  pub outcome:  Option<TournamentOutcome>,
}

#[derive(Debug, Clone)]
pub struct Tournament {
  candidates: Vec<Candidate>,
  lens:       Lens,
  max_rounds: usize,
  pairing:    usize,
  winners:    Vec<Candidate>,
}

impl Tournament {
  /// One round per complete pairing.
  pub fn new(candidates: Vec<Candidate>, lens: Lens) -> Self {
    let max_rounds = candidates.len() / 2;
    Self { candidates, lens, max_rounds, pairing: 0, winners: Vec::new() }
  }

  /// Stop after `rounds` picks even if pairings remain.
  pub fn with_max_rounds(mut self, rounds: usize) -> Self {
    self.max_rounds = rounds;
    self
  }

  pub fn lens(&self) -> Lens { self.lens }

  pub fn candidates(&self) -> &[Candidate] { &self.candidates }

  pub fn winners(&self) -> &[Candidate] { &self.winners }

  /// Number of picks this tournament will ask for.
  pub fn rounds(&self) -> usize { self.max_rounds.min(self.candidates.len() / 2) }

  pub fn is_finished(&self) -> bool {
    self.winners.len() >= self.max_rounds
      || 2 * self.pairing + 1 >= self.candidates.len()
  }

  pub fn current_pair(&self) -> Option<(&Candidate, &Candidate)> {
    if self.is_finished() {
      return None;
    }
    let i = 2 * self.pairing;
    Some((&self.candidates[i], &self.candidates[i + 1]))
  }

  /// Record the winner of the current pairing.
  pub fn submit(&mut self, winner: Uuid) -> Result<()> {
    let (left, right) = self.current_pair().ok_or(Error::TournamentFinished)?;
    let picked = if left.id == winner {
      left.clone()
    } else if right.id == winner {
      right.clone()
    } else {
      return Err(Error::InvalidPick(winner));
    };
    tracing::debug!(pairing = self.pairing, winner = %picked.id, "tournament pick");
    self.winners.push(picked);
    self.pairing += 1;
    Ok(())
  }

  pub fn outcome(&self) -> Option<TournamentOutcome> {
    if !self.is_finished() {
      return None;
    }
    let pattern = classify_pattern(&self.winners, self.lens);
    Some(TournamentOutcome {
      winners: self.winners.clone(),
      pattern,
      insight: pattern.insight(),
    })
  }

  pub fn state(&self) -> TournamentState {
    TournamentState {
      lens:    self.lens,
      pairing: self.pairing,
      rounds:  self.rounds(),
      current: self.current_pair().map(|(a, b)| (a.clone(), b.clone())),
      winners: self.winners.clone(),
      outcome: self.outcome(),
    }
  }
}

//! Relationship Quality Score (RQS): the eight-question qualitative grade.
//!
//! Each answer scores 0, 1 or 2. Questions are paired into four areas
//! (safety, vitality, growth, reciprocity), so the four area scores always
//! add up to the total. A grade can also be synthesized from declared
//! metrics when no questionnaire has been completed; [`GradeSource`] records
//! which path produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{
  Error, Result,
  relationship::{Metrics, RelationshipRecord},
  store::Diagnosis,
};

/// Event label attached to history entries written by a graded
/// questionnaire.
pub const RQS_EVENT: &str = "RQS assessment";

/// Highest possible total.
pub const MAX_TOTAL: u8 = 16;

// ─── Questions ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Area {
  Safety,
  Vitality,
  Growth,
  Reciprocity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RqsQuestion {
  pub area:   Area,
  pub prompt: &'static str,
}

pub static QUESTIONS: [RqsQuestion; 8] = [
  RqsQuestion {
    area:   Area::Safety,
    prompt: "I can disagree with them without fearing the relationship.",
  },
  RqsQuestion {
    area:   Area::Safety,
    prompt: "I trust them with things that matter to me.",
  },
  RqsQuestion {
    area:   Area::Vitality,
    prompt: "I usually leave our time together with more energy.",
  },
  RqsQuestion {
    area:   Area::Vitality,
    prompt: "We still laugh or have fun together.",
  },
  RqsQuestion {
    area:   Area::Growth,
    prompt: "They encourage me to become a better version of myself.",
  },
  RqsQuestion {
    area:   Area::Growth,
    prompt: "I learn something from them or through them.",
  },
  RqsQuestion {
    area:   Area::Reciprocity,
    prompt: "Effort between us feels balanced over time.",
  },
  RqsQuestion {
    area:   Area::Reciprocity,
    prompt: "They show up for me the way I show up for them.",
  },
];

/// One of the three allowed response levels.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Answer {
  #[strum(serialize = "rarely")]
  Rarely = 0,
  #[strum(serialize = "sometimes")]
  Sometimes = 1,
  #[strum(serialize = "consistently")]
  Consistently = 2,
}

impl Answer {
  pub fn score(self) -> u8 { self as u8 }

  pub fn from_score(score: u8) -> Result<Self> {
    match score {
      0 => Ok(Self::Rarely),
      1 => Ok(Self::Sometimes),
      2 => Ok(Self::Consistently),
      other => Err(Error::InvalidAnswer(other)),
    }
  }
}

impl TryFrom<u8> for Answer {
  type Error = Error;

  fn try_from(score: u8) -> Result<Self> { Self::from_score(score) }
}

impl From<Answer> for u8 {
  fn from(answer: Answer) -> u8 { answer.score() }
}

// ─── Grades ──────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
  Serialize, Deserialize,
)]
pub enum Grade {
  S,
  A,
  B,
  C,
}

/// The label shown alongside a grade; one per grade.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  #[strum(serialize = "Flourishing")]
  Flourishing,
  #[strum(serialize = "Healthy")]
  Healthy,
  #[strum(serialize = "Needs attention")]
  NeedsAttention,
  #[strum(serialize = "At risk")]
  AtRisk,
}

/// Presentation data for a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GradeProfile {
  pub grade:    Grade,
  pub category: Category,
  /// Hex display color.
  pub color:    &'static str,
  pub actions:  &'static [&'static str],
}

impl Grade {
  /// First matching inclusive lower bound wins, checked S → A → B → C.
  pub fn from_total(total: u8) -> Self {
    match total {
      14.. => Self::S,
      10.. => Self::A,
      6.. => Self::B,
      _ => Self::C,
    }
  }

  pub fn category(self) -> Category { self.profile().category }

  pub fn profile(self) -> GradeProfile {
    match self {
      Self::S => GradeProfile {
        grade:    self,
        category: Category::Flourishing,
        color:    "#2e9e6a",
        actions:  &[
          "Tell them what the relationship means to you.",
          "Protect regular time together.",
          "Celebrate a shared milestone.",
        ],
      },
      Self::A => GradeProfile {
        grade:    self,
        category: Category::Healthy,
        color:    "#4a86c5",
        actions:  &[
          "Plan something new together.",
          "Ask how you can support their current goals.",
        ],
      },
      Self::B => GradeProfile {
        grade:    self,
        category: Category::NeedsAttention,
        color:    "#e0a526",
        actions:  &[
          "Name one thing that has felt uneven lately.",
          "Schedule an unhurried conversation.",
          "Notice whether you leave interactions drained.",
        ],
      },
      Self::C => GradeProfile {
        grade:    self,
        category: Category::AtRisk,
        color:    "#cc4b4b",
        actions:  &[
          "Set a clear boundary around what drains you.",
          "Decide how much energy this relationship should get.",
          "Talk it through with someone you trust.",
        ],
      },
    }
  }
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// Per-area sub-scores, each 0–4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AreaScores {
  pub safety:      u8,
  pub vitality:    u8,
  pub growth:      u8,
  pub reciprocity: u8,
}

impl AreaScores {
  pub fn sum(&self) -> u8 {
    self.safety + self.vitality + self.growth + self.reciprocity
  }
}

/// Which derivation produced a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GradeSource {
  Questionnaire,
  /// Estimated from declared metrics; no questionnaire on record.
  Synthesized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RqsResult {
  pub total:      u8,
  pub grade:      Grade,
  pub category:   Category,
  pub areas:      AreaScores,
  pub checked_at: DateTime<Utc>,
  pub source:     GradeSource,
}

impl RqsResult {
  fn from_areas(
    areas: AreaScores,
    checked_at: DateTime<Utc>,
    source: GradeSource,
  ) -> Self {
    let total = areas.sum();
    let grade = Grade::from_total(total);
    Self { total, grade, category: grade.category(), areas, checked_at, source }
  }

  pub fn profile(&self) -> GradeProfile { self.grade.profile() }
}

/// A graded questionnaire plus the synthetic readings derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RqsAssessment {
  pub result:      RqsResult,
  pub oxytocin:    u8,
  pub cortisol:    u8,
  pub temperature: u8,
}

impl RqsAssessment {
  /// The diagnosis to hand to the store.
  pub fn diagnosis(&self) -> Diagnosis {
    Diagnosis {
      zone:        None,
      temperature: Some(self.temperature),
      oxytocin:    Some(self.oxytocin),
      cortisol:    Some(self.cortisol),
      rqs:         Some(self.result.clone()),
      event:       Some(RQS_EVENT.to_owned()),
    }
  }
}

fn percent(numerator: u8, denominator: u8) -> u8 {
  (f64::from(numerator) / f64::from(denominator) * 100.0).round() as u8
}

// ─── Scoring ─────────────────────────────────────────────────────────────────

/// Grade eight answers, given in question order.
pub fn score(answers: [Answer; 8], checked_at: DateTime<Utc>) -> RqsAssessment {
  let q = answers.map(Answer::score);
  let areas = AreaScores {
    safety:      q[0] + q[1],
    vitality:    q[2] + q[3],
    growth:      q[4] + q[5],
    reciprocity: q[6] + q[7],
  };
  let result = RqsResult::from_areas(areas, checked_at, GradeSource::Questionnaire);

  RqsAssessment {
    oxytocin: percent(areas.vitality + areas.reciprocity, 8),
    cortisol: percent(4 - areas.safety, 4),
    temperature: percent(result.total, MAX_TOTAL),
    result,
  }
}

/// Validate raw integer answers and grade them.
pub fn score_raw(raw: &[u8], checked_at: DateTime<Utc>) -> Result<RqsAssessment> {
  let answers: [u8; 8] = raw
    .try_into()
    .map_err(|_| Error::IncompleteAnswers(raw.len()))?;
  let mut parsed = [Answer::Rarely; 8];
  for (slot, value) in parsed.iter_mut().zip(answers) {
    *slot = Answer::from_score(value)?;
  }
  Ok(score(parsed, checked_at))
}

/// Estimate area scores from declared metrics: each metric maps onto one
/// area, scaled from 0–100 to 0–4.
pub fn synthesize(metrics: &Metrics, checked_at: DateTime<Utc>) -> RqsResult {
  let scale = |m: u8| (f64::from(m.min(100)) * 4.0 / 100.0).round() as u8;
  let areas = AreaScores {
    safety:      scale(metrics.trust),
    vitality:    scale(metrics.frequency),
    growth:      scale(metrics.satisfaction),
    reciprocity: scale(metrics.communication),
  };
  RqsResult::from_areas(areas, checked_at, GradeSource::Synthesized)
}

/// The questionnaire result on record, or a synthesized one when there is
/// none.
pub fn effective_grade(record: &RelationshipRecord, now: DateTime<Utc>) -> RqsResult {
  match &record.rqs {
    Some(result) => result.clone(),
    None => synthesize(&record.metrics, now),
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use strum::IntoEnumIterator;

  use super::*;

  fn now() -> DateTime<Utc> { Utc.timestamp_opt(1_700_000_000, 0).unwrap() }

  #[test]
  fn worked_example() {
    let a = score_raw(&[2, 2, 1, 1, 2, 2, 1, 1], now()).unwrap();
    assert_eq!(a.result.total, 12);
    assert_eq!(a.result.areas, AreaScores {
      safety:      4,
      vitality:    2,
      growth:      4,
      reciprocity: 2,
    });
    assert_eq!(a.result.grade, Grade::A);
    assert_eq!(a.result.category, Category::Healthy);
    assert_eq!(a.result.source, GradeSource::Questionnaire);
    assert_eq!(a.oxytocin, 50);
    assert_eq!(a.cortisol, 0);
    assert_eq!(a.temperature, 75);
  }

  #[test]
  fn grade_bands_are_exhaustive_and_exclusive() {
    for total in 0..=MAX_TOTAL {
      let grade = Grade::from_total(total);
      let expected = if total >= 14 {
        Grade::S
      } else if total >= 10 {
        Grade::A
      } else if total >= 6 {
        Grade::B
      } else {
        Grade::C
      };
      assert_eq!(grade, expected, "total {total}");
    }
  }

  #[test]
  fn areas_partition_the_total() {
    // Every answer vector: 3^8 combinations.
    for n in 0..3u32.pow(8) {
      let mut raw = [0u8; 8];
      let mut rest = n;
      for slot in raw.iter_mut() {
        *slot = (rest % 3) as u8;
        rest /= 3;
      }
      let a = score_raw(&raw, now()).unwrap();
      let total: u8 = raw.iter().sum();
      assert_eq!(a.result.total, total);
      assert_eq!(a.result.areas.sum(), total);
      for area in [
        a.result.areas.safety,
        a.result.areas.vitality,
        a.result.areas.growth,
        a.result.areas.reciprocity,
      ] {
        assert!(area <= 4);
      }
      assert!(a.oxytocin <= 100 && a.cortisol <= 100 && a.temperature <= 100);
    }
  }

  #[test]
  fn extremes() {
    let top = score([Answer::Consistently; 8], now());
    assert_eq!(top.result.grade, Grade::S);
    assert_eq!(top.temperature, 100);
    assert_eq!(top.oxytocin, 100);
    assert_eq!(top.cortisol, 0);

    let bottom = score([Answer::Rarely; 8], now());
    assert_eq!(bottom.result.grade, Grade::C);
    assert_eq!(bottom.temperature, 0);
    assert_eq!(bottom.oxytocin, 0);
    assert_eq!(bottom.cortisol, 100);
  }

  #[test]
  fn invalid_answers_are_rejected() {
    assert!(matches!(
      score_raw(&[0, 1, 2, 3, 0, 0, 0, 0], now()),
      Err(Error::InvalidAnswer(3))
    ));
    assert!(matches!(score_raw(&[1, 1, 1], now()), Err(Error::IncompleteAnswers(3))));
  }

  #[test]
  fn every_grade_has_a_distinct_profile() {
    let profiles: Vec<GradeProfile> = Grade::iter().map(Grade::profile).collect();
    assert_eq!(profiles.len(), 4);
    for (i, p) in profiles.iter().enumerate() {
      assert!(!p.actions.is_empty());
      for other in &profiles[i + 1..] {
        assert_ne!(p.category, other.category);
        assert_ne!(p.color, other.color);
      }
    }
  }

  #[test]
  fn synthesized_grade_is_labelled() {
    let metrics = Metrics { trust: 100, communication: 75, frequency: 50, satisfaction: 0 };
    let result = synthesize(&metrics, now());
    assert_eq!(result.source, GradeSource::Synthesized);
    assert_eq!(result.areas, AreaScores {
      safety:      4,
      vitality:    2,
      growth:      0,
      reciprocity: 3,
    });
    assert_eq!(result.total, 9);
    assert_eq!(result.grade, Grade::B);
  }

  #[test]
  fn effective_grade_prefers_questionnaire() {
    use crate::{relationship::{NewRelationship, RelationshipKind}, store::RelationshipStore};

    let mut store = RelationshipStore::new();
    let id = store.create(NewRelationship::new("Ana", RelationshipKind::Mentor)).id;

    let synthesized = effective_grade(store.get(id).unwrap(), now());
    assert_eq!(synthesized.source, GradeSource::Synthesized);
    // Default metrics of 50 scale to 2 per area.
    assert_eq!(synthesized.total, 8);

    let assessment = score([Answer::Consistently; 8], now());
    store.apply_rqs(id, &assessment).unwrap();
    let graded = effective_grade(store.get(id).unwrap(), now());
    assert_eq!(graded.source, GradeSource::Questionnaire);
    assert_eq!(graded.grade, Grade::S);
  }

  #[test]
  fn answers_serialise_as_scores() {
    assert_eq!(serde_json::to_string(&Answer::Sometimes).unwrap(), "1");
    assert!(serde_json::from_str::<Answer>("4").is_err());
  }
}

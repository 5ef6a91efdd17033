//! Error types for `orbit-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("relationship not found: {0}")]
  RelationshipNotFound(Uuid),

  #[error("zone must be between 1 and 5, got {0}")]
  InvalidZone(u8),

  #[error("questionnaire answers must be 0, 1 or 2, got {0}")]
  InvalidAnswer(u8),

  #[error("expected 8 questionnaire answers, got {0}")]
  IncompleteAnswers(usize),

  #[error("candidate {0} is not part of the current pairing")]
  InvalidPick(Uuid),

  #[error("tournament has already finished")]
  TournamentFinished,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

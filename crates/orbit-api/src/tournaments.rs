//! Handlers for `/tournaments` endpoints.
//!
//! Tournaments live in memory only; they are discarded on restart. A
//! tournament is dropped as soon as the pick that finishes it has returned its
//! outcome, after which its id answers 404.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/tournaments` | Body: `{"lens":"positive","size":8}` or explicit `candidates` |
//! | `GET`  | `/tournaments/:id` | Current pairing, winners, outcome once finished |
//! | `POST` | `/tournaments/:id/picks` | Body: `{"winner":"<uuid>"}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use orbit_core::{
  repository::RelationshipRepository,
  tournament::{
    Candidate, DEFAULT_BRACKET_SIZE, Lens, Tournament, TournamentState,
    select_candidates,
  },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Start ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StartBody {
  pub lens:       Lens,
  /// Number of candidates drawn from the store when `candidates` is absent.
  pub size:       Option<usize>,
  /// Explicit candidate ids, paired in the given order.
  pub candidates: Option<Vec<Uuid>>,
  /// Stop after this many picks.
  pub rounds:     Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TournamentResponse {
  pub id:    Uuid,
  pub state: TournamentState,
}

/// `POST /tournaments`
pub async fn start<R: RelationshipRepository>(
  State(state): State<AppState<R>>,
  Json(body): Json<StartBody>,
) -> Result<impl IntoResponse, ApiError> {
  let candidates = {
    let store = state.store.lock().await;
    match body.candidates {
      Some(ids) => ids
        .into_iter()
        .map(|id| {
          store
            .get(id)
            .map(Candidate::from)
            .ok_or_else(|| ApiError::NotFound(format!("relationship {id} not found")))
        })
        .collect::<Result<Vec<_>, _>>()?,
      None => select_candidates(
        store.list(),
        body.lens,
        body.size.unwrap_or(DEFAULT_BRACKET_SIZE),
      ),
    }
  };
  if candidates.len() < 2 {
    return Err(ApiError::BadRequest(
      "a tournament needs at least two candidates".into(),
    ));
  }

  let mut tournament = Tournament::new(candidates, body.lens);
  if let Some(rounds) = body.rounds {
    tournament = tournament.with_max_rounds(rounds);
  }

  let id = Uuid::new_v4();
  let view = tournament.state();
  if !tournament.is_finished() {
    state.tournaments.lock().await.insert(id, tournament);
  }
  tracing::info!(%id, lens = %body.lens, rounds = view.rounds, "tournament started");
  Ok((StatusCode::CREATED, Json(TournamentResponse { id, state: view })))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /tournaments/:id`
pub async fn get_one<R: RelationshipRepository>(
  State(state): State<AppState<R>>,
  Path(id): Path<Uuid>,
) -> Result<Json<TournamentState>, ApiError> {
  state
    .tournaments
    .lock()
    .await
    .get(&id)
    .map(|t| Json(t.state()))
    .ok_or_else(|| ApiError::NotFound(format!("tournament {id} not found")))
}

// ─── Pick ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PickBody {
  pub winner: Uuid,
}

/// `POST /tournaments/:id/picks`
pub async fn pick<R: RelationshipRepository>(
  State(state): State<AppState<R>>,
  Path(id): Path<Uuid>,
  Json(body): Json<PickBody>,
) -> Result<Json<TournamentState>, ApiError> {
  let mut tournaments = state.tournaments.lock().await;
  let tournament = tournaments
    .get_mut(&id)
    .ok_or_else(|| ApiError::NotFound(format!("tournament {id} not found")))?;
  tournament.submit(body.winner)?;
  let view = tournament.state();
  if tournament.is_finished() {
    tournaments.remove(&id);
    tracing::info!(%id, "tournament finished");
  }
  Ok(Json(view))
}

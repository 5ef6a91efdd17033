//! Handlers for `/relationships` record endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/relationships` | All records, creation order |
//! | `POST`   | `/relationships` | Body: `{"name":"…","kind":"friend"}` |
//! | `GET`    | `/relationships/:id` | 404 if not found |
//! | `PATCH`  | `/relationships/:id` | Partial update |
//! | `DELETE` | `/relationships/:id` | 204 on success |
//! | `POST`   | `/relationships/:id/interactions` | Logs one history entry |
//! | `POST`   | `/relationships/:id/diagnosis` | Applies a raw diagnosis |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use orbit_core::{
  history::{DEFAULT_TEMPERATURE, parse_temperature},
  relationship::{NewRelationship, RelationshipPatch, RelationshipRecord},
  repository::RelationshipRepository,
  store::{Diagnosis, Interaction},
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /relationships`
pub async fn list<R: RelationshipRepository>(
  State(state): State<AppState<R>>,
) -> Json<Vec<RelationshipRecord>> {
  Json(state.store.lock().await.list().to_vec())
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /relationships`
pub async fn create<R: RelationshipRepository>(
  State(state): State<AppState<R>>,
  Json(body): Json<NewRelationship>,
) -> Result<impl IntoResponse, ApiError> {
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }
  let record = state
    .mutate(None, |store| Ok(store.create(body).clone()))
    .await?;
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /relationships/:id`
pub async fn get_one<R: RelationshipRepository>(
  State(state): State<AppState<R>>,
  Path(id): Path<Uuid>,
) -> Result<Json<RelationshipRecord>, ApiError> {
  state
    .store
    .lock()
    .await
    .get(id)
    .cloned()
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("relationship {id} not found")))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /relationships/:id`
pub async fn update<R: RelationshipRepository>(
  State(state): State<AppState<R>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<RelationshipPatch>,
) -> Result<Json<RelationshipRecord>, ApiError> {
  if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }
  let record = state
    .mutate(Some(id), |store| store.update(id, patch).cloned())
    .await?;
  Ok(Json(record))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /relationships/:id`
pub async fn delete_one<R: RelationshipRepository>(
  State(state): State<AppState<R>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  let mut store = state.store.lock().await;
  let removed = store
    .delete(id)
    .ok_or_else(|| ApiError::NotFound(format!("relationship {id} not found")))?;
  if let Err(e) = state.repo.delete(id).await {
    store.restore(removed);
    tracing::warn!(%id, "delete failed, record restored");
    return Err(ApiError::store(e));
  }
  Ok(StatusCode::NO_CONTENT)
}

// ─── Interactions ─────────────────────────────────────────────────────────────

/// Body of `POST /relationships/:id/interactions`. The temperature may be a
/// number or a numeric string; anything else falls back to the default.
#[derive(Debug, Deserialize)]
pub struct InteractionBody {
  #[serde(default)]
  pub date:        Option<DateTime<Utc>>,
  #[serde(default)]
  pub temperature: Option<Value>,
  #[serde(default)]
  pub title:       Option<String>,
  #[serde(default)]
  pub description: Option<String>,
}

fn raw_temperature(value: Option<Value>) -> Option<f64> {
  match value? {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => Some(f64::from(parse_temperature(&s))),
    Value::Null => None,
    other => {
      tracing::warn!(value = %other, "unusable temperature, using default");
      Some(f64::from(DEFAULT_TEMPERATURE))
    }
  }
}

/// `POST /relationships/:id/interactions`
pub async fn log_interaction<R: RelationshipRepository>(
  State(state): State<AppState<R>>,
  Path(id): Path<Uuid>,
  Json(body): Json<InteractionBody>,
) -> Result<Json<RelationshipRecord>, ApiError> {
  let interaction = Interaction {
    date:        body.date.unwrap_or_else(Utc::now),
    temperature: raw_temperature(body.temperature),
    title:       body.title,
    description: body.description,
  };
  let record = state
    .mutate(Some(id), |store| store.log_interaction(id, interaction).cloned())
    .await?;
  Ok(Json(record))
}

// ─── Diagnosis ────────────────────────────────────────────────────────────────

/// `POST /relationships/:id/diagnosis`
pub async fn apply_diagnosis<R: RelationshipRepository>(
  State(state): State<AppState<R>>,
  Path(id): Path<Uuid>,
  Json(diagnosis): Json<Diagnosis>,
) -> Result<Json<RelationshipRecord>, ApiError> {
  let record = state
    .mutate(Some(id), |store| store.apply_diagnosis(id, diagnosis).cloned())
    .await?;
  Ok(Json(record))
}

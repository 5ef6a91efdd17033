//! Handlers that classify or grade a single relationship.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/relationships/:id/reclassify` | Zone from declared metrics |
//! | `POST` | `/relationships/:id/checklist` | Body: `{"answers":[false,true]}` |
//! | `POST` | `/relationships/:id/rqs` | Body: `{"answers":[0,1,2,…]}` (8 values) |
//! | `GET`  | `/relationships/:id/grade` | Questionnaire or synthesized grade |
//! | `GET`  | `/questionnaires/checklist` | The ten checklist questions |
//! | `GET`  | `/questionnaires/rqs` | The eight RQS questions |

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::Utc;
use orbit_core::{
  relationship::RelationshipRecord,
  repository::RelationshipRepository,
  rqs::{self, GradeProfile, QUESTIONS, RqsAssessment, RqsQuestion, RqsResult},
  zone::{CHECKLIST, ChecklistItem, ZoneVerdict, classify_checklist},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Reclassify ───────────────────────────────────────────────────────────────

/// `POST /relationships/:id/reclassify`
pub async fn reclassify<R: RelationshipRepository>(
  State(state): State<AppState<R>>,
  Path(id): Path<Uuid>,
) -> Result<Json<RelationshipRecord>, ApiError> {
  let record = state
    .mutate(Some(id), |store| store.reclassify(id).cloned())
    .await?;
  Ok(Json(record))
}

// ─── Checklist ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChecklistBody {
  /// Answers in question order; anything after the first `true` is ignored.
  pub answers: Vec<bool>,
}

#[derive(Debug, Serialize)]
pub struct ChecklistResponse {
  pub verdict: ZoneVerdict,
  pub record:  RelationshipRecord,
}

/// `POST /relationships/:id/checklist`
pub async fn checklist<R: RelationshipRepository>(
  State(state): State<AppState<R>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ChecklistBody>,
) -> Result<Json<ChecklistResponse>, ApiError> {
  let answered = body.answers.len();
  let verdict = classify_checklist(body.answers).ok_or_else(|| {
    ApiError::BadRequest(format!(
      "checklist incomplete: {answered} of {} answered without a yes",
      CHECKLIST.len()
    ))
  })?;
  let record = state
    .mutate(Some(id), |store| store.apply_checklist(id, verdict).cloned())
    .await?;
  Ok(Json(ChecklistResponse { verdict, record }))
}

/// `GET /questionnaires/checklist`
pub async fn checklist_questions() -> Json<&'static [ChecklistItem]> {
  Json(&CHECKLIST)
}

// ─── RQS ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RqsBody {
  pub answers: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct RqsResponse {
  pub assessment: RqsAssessment,
  pub profile:    GradeProfile,
  pub record:     RelationshipRecord,
}

/// `POST /relationships/:id/rqs`
pub async fn rqs<R: RelationshipRepository>(
  State(state): State<AppState<R>>,
  Path(id): Path<Uuid>,
  Json(body): Json<RqsBody>,
) -> Result<Json<RqsResponse>, ApiError> {
  let assessment = rqs::score_raw(&body.answers, Utc::now())?;
  let record = state
    .mutate(Some(id), |store| store.apply_rqs(id, &assessment).cloned())
    .await?;
  Ok(Json(RqsResponse {
    profile: assessment.result.profile(),
    assessment,
    record,
  }))
}

/// `GET /questionnaires/rqs`
pub async fn rqs_questions() -> Json<&'static [RqsQuestion]> { Json(&QUESTIONS) }

// ─── Grade ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GradeResponse {
  pub result:  RqsResult,
  pub profile: GradeProfile,
}

/// `GET /relationships/:id/grade`
pub async fn grade<R: RelationshipRepository>(
  State(state): State<AppState<R>>,
  Path(id): Path<Uuid>,
) -> Result<Json<GradeResponse>, ApiError> {
  let result = {
    let store = state.store.lock().await;
    let record = store
      .get(id)
      .ok_or_else(|| ApiError::NotFound(format!("relationship {id} not found")))?;
    rqs::effective_grade(record, Utc::now())
  };
  Ok(Json(GradeResponse { profile: result.profile(), result }))
}

//! Read-only analytics: energy distribution and per-relationship trends.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::Utc;
use orbit_core::{
  energy::{self, EnergyReport},
  repository::RelationshipRepository,
  trend::{self, Period, RECENT_WINDOW, TrendCurve, TrendSummary},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Energy ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct EnergyResponse {
  #[serde(flatten)]
  pub report:     EnergyReport,
  /// Records whose zone lies outside its target band.
  pub imbalanced: Vec<Uuid>,
}

/// `GET /energy`
pub async fn energy<R: RelationshipRepository>(
  State(state): State<AppState<R>>,
) -> Json<EnergyResponse> {
  let store = state.store.lock().await;
  let report = energy::analyze(store.list());
  let imbalanced = report.imbalanced(store.list()).iter().map(|r| r.id).collect();
  Json(EnergyResponse { report, imbalanced })
}

// ─── Trend ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TrendParams {
  #[serde(default)]
  pub period: Period,
}

#[derive(Debug, Serialize)]
pub struct TrendResponse {
  pub summary: TrendSummary,
  /// Trailing mean over the summary window, one value per entry.
  pub rolling: Vec<f64>,
  pub curve:   TrendCurve,
}

/// `GET /relationships/:id/trend[?period=week|month|year]`
pub async fn trend<R: RelationshipRepository>(
  State(state): State<AppState<R>>,
  Path(id): Path<Uuid>,
  Query(params): Query<TrendParams>,
) -> Result<Json<TrendResponse>, ApiError> {
  let store = state.store.lock().await;
  let record = store
    .get(id)
    .ok_or_else(|| ApiError::NotFound(format!("relationship {id} not found")))?;
  let history = &record.history;
  Ok(Json(TrendResponse {
    summary: trend::summarize(history),
    rolling: trend::rolling_averages(history, RECENT_WINDOW),
    curve:   trend::curve(history, params.period, Utc::now()),
  }))
}

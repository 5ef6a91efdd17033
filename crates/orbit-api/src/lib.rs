//! JSON REST API for Orbit.
//!
//! Exposes an axum [`Router`] over an in-memory
//! [`orbit_core::store::RelationshipStore`] that is persisted through any
//! [`RelationshipRepository`]. Every mutating handler saves the touched
//! record under the store lock before responding.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", orbit_api::api_router(state.clone()))
//! ```

pub mod assessments;
pub mod error;
pub mod insights;
pub mod relationships;
pub mod tournaments;

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use orbit_core::{
  relationship::RelationshipRecord,
  repository::RelationshipRepository,
  store::RelationshipStore,
  tournament::Tournament,
};
use serde::Deserialize;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ORBIT_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 7878 }

fn default_store_path() -> PathBuf { PathBuf::from("orbit.db") }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       default_host(),
      port:       default_port(),
      store_path: default_store_path(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<R: RelationshipRepository> {
  pub store:       Arc<Mutex<RelationshipStore>>,
  pub repo:        Arc<R>,
  pub tournaments: Arc<Mutex<HashMap<Uuid, Tournament>>>,
}

impl<R: RelationshipRepository> Clone for AppState<R> {
  fn clone(&self) -> Self {
    Self {
      store:       Arc::clone(&self.store),
      repo:        Arc::clone(&self.repo),
      tournaments: Arc::clone(&self.tournaments),
    }
  }
}

impl<R: RelationshipRepository> AppState<R> {
  /// Load every persisted record into a fresh in-memory store.
  pub async fn load(repo: R) -> Result<Self, R::Error> {
    let records = repo.load_all().await?;
    tracing::info!(count = records.len(), "loaded relationships");
    Ok(Self {
      store:       Arc::new(Mutex::new(RelationshipStore::from_records(records))),
      repo:        Arc::new(repo),
      tournaments: Arc::new(Mutex::new(HashMap::new())),
    })
  }

  /// Run `apply` against the store and write the resulting record through to
  /// the repository while the store lock is still held, so writes reach the
  /// database in the order they were applied in memory.
  ///
  /// `target` names the record being changed, or `None` when `apply` creates
  /// one. If the save fails the in-memory change is undone.
  pub(crate) async fn mutate<F>(
    &self,
    target: Option<Uuid>,
    apply: F,
  ) -> Result<RelationshipRecord, ApiError>
  where
    F: FnOnce(&mut RelationshipStore) -> orbit_core::Result<RelationshipRecord>,
  {
    let mut store = self.store.lock().await;
    let snapshot = target.and_then(|id| store.get(id).cloned());
    let record = apply(&mut store)?;

    if let Err(e) = self.repo.save(&record).await {
      match snapshot {
        Some(previous) => store.restore(previous),
        None => {
          store.delete(record.id);
        }
      }
      tracing::warn!(id = %record.id, "save failed, in-memory change rolled back");
      return Err(ApiError::store(e));
    }
    Ok(record)
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
pub fn api_router<R>(state: AppState<R>) -> Router<()>
where
  R: RelationshipRepository + 'static,
{
  Router::new()
    // Records
    .route(
      "/relationships",
      get(relationships::list::<R>).post(relationships::create::<R>),
    )
    .route(
      "/relationships/{id}",
      get(relationships::get_one::<R>)
        .patch(relationships::update::<R>)
        .delete(relationships::delete_one::<R>),
    )
    .route("/relationships/{id}/interactions", post(relationships::log_interaction::<R>))
    .route("/relationships/{id}/diagnosis", post(relationships::apply_diagnosis::<R>))
    // Assessments
    .route("/relationships/{id}/reclassify", post(assessments::reclassify::<R>))
    .route("/relationships/{id}/checklist", post(assessments::checklist::<R>))
    .route("/relationships/{id}/rqs", post(assessments::rqs::<R>))
    .route("/relationships/{id}/grade", get(assessments::grade::<R>))
    .route("/questionnaires/checklist", get(assessments::checklist_questions))
    .route("/questionnaires/rqs", get(assessments::rqs_questions))
    // Insights
    .route("/relationships/{id}/trend", get(insights::trend::<R>))
    .route("/energy", get(insights::energy::<R>))
    // Tournaments
    .route("/tournaments", post(tournaments::start::<R>))
    .route("/tournaments/{id}", get(tournaments::get_one::<R>))
    .route("/tournaments/{id}/picks", post(tournaments::pick::<R>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
  };
  use orbit_core::relationship::{NewRelationship, RelationshipKind};
  use orbit_store_sqlite::SqliteRepository;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  async fn make_state() -> AppState<SqliteRepository> {
    let repo = SqliteRepository::open_in_memory().await.unwrap();
    AppState::load(repo).await.unwrap()
  }

  async fn send<R: RelationshipRepository + 'static>(
    state: &AppState<R>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(json) => builder
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    api_router(state.clone()).oneshot(req).await.unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn create(state: &AppState<SqliteRepository>, name: &str) -> String {
    let resp = send(
      state,
      "POST",
      "/relationships",
      Some(json!({ "name": name, "kind": "friend" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    json_body(resp).await["id"].as_str().unwrap().to_owned()
  }

  // ── Records ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_list_and_get() {
    let state = make_state().await;
    let id = create(&state, "Mara").await;

    let list = json_body(send(&state, "GET", "/relationships", None).await).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let resp = send(&state, "GET", &format!("/relationships/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let record = json_body(resp).await;
    assert_eq!(record["name"], "Mara");
    assert_eq!(record["zone"], 3);
    assert_eq!(record["temperature"], 50);
  }

  #[tokio::test]
  async fn blank_name_is_rejected() {
    let state = make_state().await;
    let resp = send(&state, "POST", "/relationships", Some(json!({ "name": "  " }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn unknown_relationship_is_404() {
    let state = make_state().await;
    let uri = format!("/relationships/{}", Uuid::new_v4());
    assert_eq!(send(&state, "GET", &uri, None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
      send(&state, "DELETE", &uri, None).await.status(),
      StatusCode::NOT_FOUND
    );
  }

  #[tokio::test]
  async fn mutations_are_persisted() {
    let state = make_state().await;
    let id = create(&state, "Ilse").await;
    send(
      &state,
      "PATCH",
      &format!("/relationships/{id}"),
      Some(json!({ "trust": 95, "role": "sister" })),
    )
    .await;
    send(
      &state,
      "POST",
      &format!("/relationships/{id}/interactions"),
      Some(json!({ "temperature": "81", "title": "dinner" })),
    )
    .await;

    let saved = state.repo.load_all().await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].role, "sister");
    assert_eq!(saved[0].metrics.trust, 95);
    assert_eq!(saved[0].temperature, 81);
    assert_eq!(saved[0].history.len(), 1);
  }

  #[tokio::test]
  async fn invalid_interaction_temperature_becomes_default() {
    let state = make_state().await;
    let id = create(&state, "Teo").await;
    let resp = send(
      &state,
      "POST",
      &format!("/relationships/{id}/interactions"),
      Some(json!({ "temperature": "warm" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["temperature"], 50);
  }

  #[tokio::test]
  async fn delete_removes_from_store_and_repository() {
    let state = make_state().await;
    let id = create(&state, "Ola").await;
    let resp = send(&state, "DELETE", &format!("/relationships/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(state.store.lock().await.is_empty());
    assert!(state.repo.load_all().await.unwrap().is_empty());
  }

  // ── Failed writes ───────────────────────────────────────────────────────────

  /// A backend that accepts reads but rejects every write.
  struct ReadOnlyRepo;

  impl RelationshipRepository for ReadOnlyRepo {
    type Error = std::io::Error;

    async fn load_all(&self) -> Result<Vec<RelationshipRecord>, Self::Error> { Ok(Vec::new()) }

    async fn save(&self, _record: &RelationshipRecord) -> Result<(), Self::Error> {
      Err(std::io::Error::other("read-only store"))
    }

    async fn delete(&self, _id: Uuid) -> Result<bool, Self::Error> {
      Err(std::io::Error::other("read-only store"))
    }
  }

  /// A read-only state seeded with one record named "Mara".
  fn read_only_state() -> (AppState<ReadOnlyRepo>, Uuid) {
    let mut store = RelationshipStore::new();
    let id = store
      .create(NewRelationship::new("Mara", RelationshipKind::Friend))
      .id;
    let state = AppState {
      store:       Arc::new(Mutex::new(store)),
      repo:        Arc::new(ReadOnlyRepo),
      tournaments: Arc::new(Mutex::new(HashMap::new())),
    };
    (state, id)
  }

  #[tokio::test]
  async fn failed_save_rolls_back_interaction() {
    let (state, id) = read_only_state();
    let resp = send(
      &state,
      "POST",
      &format!("/relationships/{id}/interactions"),
      Some(json!({ "temperature": 90 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let store = state.store.lock().await;
    let record = store.get(id).unwrap();
    assert_eq!(record.temperature, 50);
    assert!(record.history.is_empty());
    assert!(record.last_interaction.is_none());
  }

  #[tokio::test]
  async fn failed_save_rolls_back_update_and_create() {
    let (state, id) = read_only_state();
    let resp = send(
      &state,
      "PATCH",
      &format!("/relationships/{id}"),
      Some(json!({ "name": "Mira", "trust": 90 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let resp = send(
      &state,
      "POST",
      "/relationships",
      Some(json!({ "name": "Teo", "kind": "friend" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let store = state.store.lock().await;
    assert_eq!(store.len(), 1);
    let record = store.get(id).unwrap();
    assert_eq!(record.name, "Mara");
    assert_eq!(record.metrics.trust, 50);
  }

  #[tokio::test]
  async fn failed_delete_keeps_record() {
    let (state, id) = read_only_state();
    let resp = send(&state, "DELETE", &format!("/relationships/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(state.store.lock().await.get(id).is_some());
  }

  #[tokio::test]
  async fn failed_save_rolls_back_checklist() {
    let (state, id) = read_only_state();
    let resp = send(
      &state,
      "POST",
      &format!("/relationships/{id}/checklist"),
      Some(json!({ "answers": [true] })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let store = state.store.lock().await;
    let record = store.get(id).unwrap();
    assert_eq!(record.zone.number(), 3);
    assert!(record.history.is_empty());
  }

  // ── Assessments ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn checklist_applies_first_yes() {
    let state = make_state().await;
    let id = create(&state, "Ren").await;
    let resp = send(
      &state,
      "POST",
      &format!("/relationships/{id}/checklist"),
      Some(json!({ "answers": [false, false, true] })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["verdict"]["zone"], 2);
    assert_eq!(body["record"]["zone"], 2);
    assert_eq!(body["record"]["temperature"], 85);
  }

  #[tokio::test]
  async fn incomplete_checklist_is_rejected() {
    let state = make_state().await;
    let id = create(&state, "Ren").await;
    let resp = send(
      &state,
      "POST",
      &format!("/relationships/{id}/checklist"),
      Some(json!({ "answers": [false, false] })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn rqs_grades_and_stores_result() {
    let state = make_state().await;
    let id = create(&state, "Sol").await;
    let resp = send(
      &state,
      "POST",
      &format!("/relationships/{id}/rqs"),
      Some(json!({ "answers": [2, 2, 2, 2, 2, 2, 1, 1] })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["assessment"]["result"]["total"], 14);
    assert_eq!(body["assessment"]["result"]["grade"], "S");

    let grade =
      json_body(send(&state, "GET", &format!("/relationships/{id}/grade"), None).await).await;
    assert_eq!(grade["result"]["source"], "questionnaire");
  }

  #[tokio::test]
  async fn rqs_rejects_bad_answers() {
    let state = make_state().await;
    let id = create(&state, "Sol").await;
    for answers in [json!([2, 2, 2]), json!([2, 2, 2, 2, 2, 2, 2, 3])] {
      let resp = send(
        &state,
        "POST",
        &format!("/relationships/{id}/rqs"),
        Some(json!({ "answers": answers })),
      )
      .await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
  }

  #[tokio::test]
  async fn grade_is_synthesized_without_questionnaire() {
    let state = make_state().await;
    let id = create(&state, "Vid").await;
    let grade =
      json_body(send(&state, "GET", &format!("/relationships/{id}/grade"), None).await).await;
    assert_eq!(grade["result"]["source"], "synthesized");
    assert_eq!(grade["result"]["total"], 8);
  }

  #[tokio::test]
  async fn reclassify_uses_metrics() {
    let state = make_state().await;
    let id = create(&state, "Kai").await;
    send(
      &state,
      "PATCH",
      &format!("/relationships/{id}"),
      Some(json!({
        "trust": 90, "communication": 90, "satisfaction": 90, "frequency": 80
      })),
    )
    .await;
    let record = json_body(
      send(&state, "POST", &format!("/relationships/{id}/reclassify"), None).await,
    )
    .await;
    assert_eq!(record["zone"], 1);
  }

  // ── Insights ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn energy_on_empty_store_uses_fallback() {
    let state = make_state().await;
    let body = json_body(send(&state, "GET", "/energy", None).await).await;
    assert_eq!(body["fallback"], true);
    assert_eq!(body["zones"][0]["percent"], 15);
  }

  #[tokio::test]
  async fn trend_accepts_period() {
    let state = make_state().await;
    let id = create(&state, "Lio").await;
    for t in [40, 40, 60, 60, 60] {
      send(
        &state,
        "POST",
        &format!("/relationships/{id}/interactions"),
        Some(json!({ "temperature": t })),
      )
      .await;
    }
    let resp = send(&state, "GET", &format!("/relationships/{id}/trend?period=week"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["summary"]["direction"], "up");
    assert_eq!(body["curve"]["period"], "week");
  }

  // ── Tournaments ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn tournament_runs_to_outcome() {
    let state = make_state().await;
    let a = create(&state, "a").await;
    let b = create(&state, "b").await;

    let resp = send(&state, "POST", "/tournaments", Some(json!({}))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let started = json_body(resp).await;
    let tid = started["id"].as_str().unwrap().to_owned();
    assert_eq!(started["state"]["rounds"], 1);

    let stranger = send(
      &state,
      "POST",
      &format!("/tournaments/{tid}/picks"),
      Some(json!({ "winner": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(stranger.status(), StatusCode::BAD_REQUEST);

    let done = json_body(
      send(
        &state,
        "POST",
        &format!("/tournaments/{tid}/picks"),
        Some(json!({ "winner": b })),
      )
      .await,
    )
    .await;
    assert_eq!(done["winners"][0]["id"].as_str().unwrap(), b);
    assert_eq!(done["outcome"]["pattern"], "vitality");

    let again = send(
      &state,
      "POST",
      &format!("/tournaments/{tid}/picks"),
      Some(json!({ "winner": a })),
    )
    .await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
    let gone = send(&state, "GET", &format!("/tournaments/{tid}"), None).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    assert!(state.tournaments.lock().await.is_empty());
  }

  #[tokio::test]
  async fn zero_round_tournament_is_not_kept() {
    let state = make_state().await;
    create(&state, "a").await;
    create(&state, "b").await;
    let resp = send(&state, "POST", "/tournaments", Some(json!({ "rounds": 0 }))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(json_body(resp).await["state"]["current"].is_null());
    assert!(state.tournaments.lock().await.is_empty());
  }

  #[tokio::test]
  async fn unknown_tournament_is_404() {
    let state = make_state().await;
    let resp = send(&state, "GET", &format!("/tournaments/{}", Uuid::new_v4()), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tracing::{debug, warn};

use crate::catalog::{default_league, find_league, League, LEAGUES};
use crate::db::cache;
use crate::db::models::{Fixture, FixtureId, Outcome, PredictionBook, TeamTableRow};
use crate::db::{Database, StoreError};
use crate::fixtures::{self, FixtureSource, StandingsSource};
use crate::predictions::{self, parse_score_input, ScoreSide};
use crate::standings::{
    compute_standings, fixtures_in_round, list_rounds, resolve_default_round, select_round,
    Standings, StandingsMode,
};

type ApiError = (StatusCode, String);

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub fixtures: Arc<dyn FixtureSource>,
    pub standings: Arc<dyn StandingsSource>,
    /// Cached fixtures older than this are fetched again on read.
    pub max_fixture_age: Duration,
    /// Serialises read-modify-write cycles on prediction books.
    pub prediction_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        db: Database,
        fixtures: Arc<dyn FixtureSource>,
        standings: Arc<dyn StandingsSource>,
        max_fixture_age: Duration,
    ) -> Self {
        AppState {
            db,
            fixtures,
            standings,
            max_fixture_age,
            prediction_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Build the Axum router for the JSON API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/leagues", get(leagues_handler))
        .route("/api/rounds", get(rounds_handler))
        .route("/api/fixtures", get(fixtures_handler))
        .route("/api/standings", get(standings_handler))
        .route("/api/standings/official", get(official_standings_handler))
        .route(
            "/api/predictions",
            get(predictions_handler).delete(clear_predictions_handler),
        )
        .route("/api/predictions/:fixture_id/outcome", put(select_outcome_handler))
        .route("/api/predictions/:fixture_id/score", put(score_guess_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub league: Option<String>,
    pub season: Option<u16>,
    pub round: Option<u32>,
    pub mode: Option<StandingsMode>,
}

#[derive(Debug, Serialize)]
pub struct RoundsResponse {
    pub league: &'static str,
    pub season: u16,
    pub rounds: Vec<u32>,
    pub current_round: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct FixturesResponse {
    pub league: &'static str,
    pub season: u16,
    pub rounds: Vec<u32>,
    pub round: Option<u32>,
    pub fixtures: Vec<Fixture>,
    pub predictions: PredictionBook,
}

#[derive(Debug, Serialize)]
pub struct StandingsResponse {
    pub league: &'static str,
    pub season: u16,
    pub rounds: Vec<u32>,
    pub mode: StandingsMode,
    /// Rows of the table selected by `mode`.
    pub table: Vec<TeamTableRow>,
    #[serde(flatten)]
    pub standings: Standings,
}

#[derive(Debug, Serialize)]
pub struct PredictionsResponse {
    pub league: &'static str,
    pub season: u16,
    pub predictions: PredictionBook,
}

#[derive(Debug, Deserialize)]
pub struct OutcomeBody {
    pub league: Option<String>,
    pub season: Option<u16>,
    pub outcome: Outcome,
}

/// A score as typed by the user, or already a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ScoreInput {
    Number(u32),
    Text(String),
}

impl ScoreInput {
    fn value(&self) -> Option<u32> {
        match self {
            ScoreInput::Number(n) => Some(*n),
            ScoreInput::Text(text) => parse_score_input(text),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScoreBody {
    pub league: Option<String>,
    pub season: Option<u16>,
    pub side: ScoreSide,
    #[serde(default)]
    pub value: Option<ScoreInput>,
}

/// League and season a request is about; defaults to the default league's latest season.
fn resolve_scope(league: Option<&str>, season: Option<u16>) -> Result<(&'static League, u16), ApiError> {
    let league = match league {
        Some(id) => find_league(id)
            .ok_or_else(|| (StatusCode::NOT_FOUND, format!("unknown league {}", id)))?,
        None => default_league(),
    };
    let season = match season.or_else(|| league.latest_season()) {
        Some(s) if league.has_season(s) => s,
        Some(s) => {
            return Err((
                StatusCode::NOT_FOUND,
                format!("season {} is not offered for {}", s, league.id),
            ))
        }
        None => {
            return Err((
                StatusCode::NOT_FOUND,
                format!("no seasons configured for {}", league.id),
            ))
        }
    };
    Ok((league, season))
}

async fn season_fixtures(
    state: &AppState,
    league: &League,
    season: u16,
) -> Result<Vec<Fixture>, ApiError> {
    fixtures::cached_or_load_fixtures(
        state.fixtures.as_ref(),
        &state.db,
        league.id,
        season,
        state.max_fixture_age,
    )
    .await
    .map_err(|e| {
        warn!("No fixtures available for {} {}: {}", league.id, season, e);
        (StatusCode::BAD_GATEWAY, e.to_string())
    })
}

/// Requested round if it exists, otherwise the current one.
fn view_round(fixtures: &[Fixture], rounds: &[u32], league: &League, season: u16, requested: Option<u32>) -> Option<u32> {
    let current = resolve_default_round(fixtures, rounds, league.is_latest_season(season));
    select_round(requested, rounds, current)
}

/// GET /api/leagues
async fn leagues_handler() -> Json<&'static [League]> {
    Json(LEAGUES)
}

/// GET /api/rounds?league=PL&season=2025
async fn rounds_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ViewQuery>,
) -> Result<Json<RoundsResponse>, ApiError> {
    let (league, season) = resolve_scope(q.league.as_deref(), q.season)?;
    let fixtures = season_fixtures(&state, league, season).await?;
    let rounds = list_rounds(&fixtures);
    let current_round = resolve_default_round(&fixtures, &rounds, league.is_latest_season(season));
    Ok(Json(RoundsResponse {
        league: league.id,
        season,
        rounds,
        current_round,
    }))
}

/// GET /api/fixtures?league=PL&season=2025&round=3
async fn fixtures_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ViewQuery>,
) -> Result<Json<FixturesResponse>, ApiError> {
    let (league, season) = resolve_scope(q.league.as_deref(), q.season)?;
    let fixtures = season_fixtures(&state, league, season).await?;
    let rounds = list_rounds(&fixtures);
    let round = view_round(&fixtures, &rounds, league, season, q.round);
    let predictions = cache::fixture_predictions(&state.db, league.id, season);
    Ok(Json(FixturesResponse {
        league: league.id,
        season,
        fixtures: fixtures_in_round(&fixtures, round),
        rounds,
        round,
        predictions,
    }))
}

/// GET /api/standings?league=PL&season=2025&round=3&mode=predicted
async fn standings_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ViewQuery>,
) -> Result<Json<StandingsResponse>, ApiError> {
    let (league, season) = resolve_scope(q.league.as_deref(), q.season)?;
    let fixtures = season_fixtures(&state, league, season).await?;
    let rounds = list_rounds(&fixtures);
    let round = view_round(&fixtures, &rounds, league, season, q.round);
    let predictions = cache::fixture_predictions(&state.db, league.id, season);
    let standings = compute_standings(&fixtures, &predictions, round);
    debug!(
        "Standings {} {} round {:?}: {} teams, {} deltas",
        league.id,
        season,
        round,
        standings.actual.len(),
        standings.deltas.len()
    );
    let mode = q.mode.unwrap_or_else(|| StandingsMode::default_for(&predictions));
    Ok(Json(StandingsResponse {
        league: league.id,
        season,
        rounds,
        mode,
        table: standings.rows(mode).to_vec(),
        standings,
    }))
}

/// GET /api/standings/official?league=PL&season=2025
async fn official_standings_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ViewQuery>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let (league, season) = resolve_scope(q.league.as_deref(), q.season)?;
    fixtures::load_official_standings(state.standings.as_ref(), &state.db, league.id, season)
        .await
        .map(Json)
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))
}

/// GET /api/predictions?league=PL&season=2025
async fn predictions_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ViewQuery>,
) -> Result<Json<PredictionsResponse>, ApiError> {
    let (league, season) = resolve_scope(q.league.as_deref(), q.season)?;
    Ok(Json(PredictionsResponse {
        league: league.id,
        season,
        predictions: cache::fixture_predictions(&state.db, league.id, season),
    }))
}

/// DELETE /api/predictions?league=PL&season=2025
async fn clear_predictions_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ViewQuery>,
) -> Result<Json<PredictionsResponse>, ApiError> {
    let (league, season) = resolve_scope(q.league.as_deref(), q.season)?;
    edit_predictions(&state, league, season, predictions::clear).await
}

/// PUT /api/predictions/:fixture_id/outcome
async fn select_outcome_handler(
    State(state): State<Arc<AppState>>,
    Path(fixture_id): Path<String>,
    Json(body): Json<OutcomeBody>,
) -> Result<Json<PredictionsResponse>, ApiError> {
    let (league, season) = resolve_scope(body.league.as_deref(), body.season)?;
    let id = FixtureId::from(fixture_id);
    debug!("Outcome {:?} picked for fixture {} ({} {})", body.outcome, id, league.id, season);
    let outcome = body.outcome;
    edit_predictions(&state, league, season, move |book| {
        predictions::select_outcome(book, &id, outcome)
    })
    .await
}

/// PUT /api/predictions/:fixture_id/score
async fn score_guess_handler(
    State(state): State<Arc<AppState>>,
    Path(fixture_id): Path<String>,
    Json(body): Json<ScoreBody>,
) -> Result<Json<PredictionsResponse>, ApiError> {
    let (league, season) = resolve_scope(body.league.as_deref(), body.season)?;
    let id = FixtureId::from(fixture_id);
    let value = body.value.as_ref().and_then(ScoreInput::value);
    debug!("Score guess {:?}={:?} for fixture {} ({} {})", body.side, value, id, league.id, season);
    let side = body.side;
    edit_predictions(&state, league, season, move |book| {
        predictions::set_score_guess(book, &id, side, value)
    })
    .await
}

async fn edit_predictions<F>(
    state: &AppState,
    league: &League,
    season: u16,
    edit: F,
) -> Result<Json<PredictionsResponse>, ApiError>
where
    F: FnOnce(&mut PredictionBook) + Send + 'static,
{
    let _guard = state.prediction_lock.lock().await;
    let db = state.db.clone();
    let league_id = league.id;

    let edited = tokio::task::spawn_blocking(move || -> Result<PredictionBook, StoreError> {
        let mut book = match cache::try_fixture_predictions(&db, league_id, season) {
            Ok(book) => book,
            Err(StoreError::Json(e)) => {
                warn!(
                    "Stored predictions for {} {} are unreadable and will be replaced: {}",
                    league_id, season, e
                );
                PredictionBook::new()
            }
            Err(e) => return Err(e),
        };
        edit(&mut book);
        cache::try_store_fixture_predictions(&db, league_id, season, &book)?;
        Ok(book)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("prediction edit aborted: {}", e)))?;

    let book = edited.map_err(|e| {
        warn!("Prediction edit failed for {} {}: {}", league_id, season, e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(Json(PredictionsResponse {
        league: league_id,
        season,
        predictions: book,
    }))
}

//! Subscriber management endpoints.

use crate::error::{AppError, Result};
use crate::services::LevelsReport;
use crate::types::{Instrument, Subscriber};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AlertsRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub pair: &'static str,
    pub followed: bool,
}

/// Levels for one followed pair; `report` is absent until the pair is ready.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairLevels {
    pub pair: &'static str,
    pub ready: bool,
    pub report: Option<LevelsReport>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:chat_id", get(get_subscriber).post(register))
        .route("/:chat_id/levels", get(followed_levels))
        .route("/:chat_id/pairs/:pair", post(toggle_pair))
        .route("/:chat_id/alerts", put(set_alerts))
}

/// GET /api/subscribers/:chat_id
async fn get_subscriber(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
) -> Result<Json<Subscriber>> {
    state
        .subscriptions
        .get(chat_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Subscriber {}", chat_id)))
}

/// POST /api/subscribers/:chat_id
async fn register(State(state): State<AppState>, Path(chat_id): Path<i64>) -> Json<Subscriber> {
    Json(state.subscriptions.register(chat_id))
}

/// GET /api/subscribers/:chat_id/levels
///
/// Reports for every followed pair, in follow order.
async fn followed_levels(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
) -> Result<Json<Vec<PairLevels>>> {
    let subscriber = state
        .subscriptions
        .get(chat_id)
        .ok_or_else(|| AppError::NotFound(format!("Subscriber {}", chat_id)))?;

    if subscriber.pairs.is_empty() {
        return Err(AppError::BadRequest(
            "No pairs selected, follow a pair first".to_string(),
        ));
    }

    let levels = subscriber
        .pairs
        .iter()
        .filter_map(|pair| Instrument::lookup(pair))
        .map(|instrument| {
            let report = state
                .store
                .get_snapshot(instrument.id)
                .and_then(|snapshot| LevelsReport::build(instrument, &snapshot));
            PairLevels {
                pair: instrument.id,
                ready: report.is_some(),
                report,
            }
        })
        .collect();

    Ok(Json(levels))
}

/// POST /api/subscribers/:chat_id/pairs/:pair
async fn toggle_pair(
    State(state): State<AppState>,
    Path((chat_id, pair)): Path<(i64, String)>,
) -> Result<Json<ToggleResponse>> {
    let instrument = Instrument::lookup(&pair)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown pair {}", pair)))?;

    let followed = state.subscriptions.toggle_pair(chat_id, instrument);
    Ok(Json(ToggleResponse {
        pair: instrument.id,
        followed,
    }))
}

/// PUT /api/subscribers/:chat_id/alerts
async fn set_alerts(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
    Json(request): Json<AlertsRequest>,
) -> Result<Json<Subscriber>> {
    state
        .subscriptions
        .set_alerts(chat_id, request.enabled)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Subscriber {}", chat_id)))
}

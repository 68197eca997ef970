//! Read-only market endpoints: snapshots, levels and signals.

use crate::error::{AppError, Result};
use crate::services::LevelsReport;
use crate::types::{Instrument, MarketSnapshot, TradingSignal, INSTRUMENTS};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

/// API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    fn new(data: T) -> Json<Self> {
        Json(Self { data })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentInfo {
    pub id: &'static str,
    pub base: &'static str,
    pub quote: &'static str,
    pub name: &'static str,
    pub pip_multiplier: f64,
    pub ready: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/instruments", get(list_instruments))
        .route("/:pair/snapshot", get(get_snapshot))
        .route("/:pair/levels", get(get_levels))
        .route("/:pair/signal", get(get_signal))
}

fn resolve(pair: &str) -> Result<&'static Instrument> {
    Instrument::lookup(pair).ok_or_else(|| AppError::NotFound(format!("Unknown pair {}", pair)))
}

fn snapshot_of(state: &AppState, instrument: &Instrument) -> Result<MarketSnapshot> {
    state
        .store
        .get_snapshot(instrument.id)
        .ok_or_else(|| AppError::Internal(format!("No snapshot slot for {}", instrument)))
}

/// GET /api/market/instruments
async fn list_instruments(State(state): State<AppState>) -> Json<ApiResponse<Vec<InstrumentInfo>>> {
    let instruments = INSTRUMENTS
        .iter()
        .map(|i| InstrumentInfo {
            id: i.id,
            base: i.base,
            quote: i.quote,
            name: i.name,
            pip_multiplier: i.pip_multiplier(),
            ready: state
                .store
                .get_snapshot(i.id)
                .is_some_and(|s| s.is_ready()),
        })
        .collect();

    ApiResponse::new(instruments)
}

/// GET /api/market/:pair/snapshot
async fn get_snapshot(
    State(state): State<AppState>,
    Path(pair): Path<String>,
) -> Result<Json<ApiResponse<MarketSnapshot>>> {
    let instrument = resolve(&pair)?;
    Ok(ApiResponse::new(snapshot_of(&state, instrument)?))
}

/// GET /api/market/:pair/levels
async fn get_levels(
    State(state): State<AppState>,
    Path(pair): Path<String>,
) -> Result<Json<ApiResponse<LevelsReport>>> {
    let instrument = resolve(&pair)?;
    let snapshot = snapshot_of(&state, instrument)?;

    let report = LevelsReport::build(instrument, &snapshot).ok_or_else(|| {
        AppError::NotReady(format!(
            "Calculating levels for {}, try again shortly",
            instrument
        ))
    })?;

    Ok(ApiResponse::new(report))
}

/// GET /api/market/:pair/signal
async fn get_signal(
    State(state): State<AppState>,
    Path(pair): Path<String>,
) -> Result<Json<ApiResponse<TradingSignal>>> {
    let instrument = resolve(&pair)?;
    let signal = state
        .store
        .get_signal(instrument)
        .ok_or_else(|| AppError::Internal(format!("No snapshot slot for {}", instrument)))?;
    Ok(ApiResponse::new(signal))
}

use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    service: &'static str,
    timestamp: DateTime<Utc>,
    subscribers: usize,
    /// "all" or "subscribed".
    tracking: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    total_subscribers: usize,
    /// Subscribers following at least one pair.
    active_subscribers: usize,
    ready_instruments: usize,
    last_update: Option<DateTime<Utc>>,
    uptime_secs: i64,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "running",
        service: "pivotwatch",
        timestamp: Utc::now(),
        subscribers: state.subscriptions.len(),
        tracking: if state.config.track_all_instruments {
            "all"
        } else {
            "subscribed"
        },
    })
}

async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        total_subscribers: state.subscriptions.len(),
        active_subscribers: state.subscriptions.with_pairs_count(),
        ready_instruments: state.store.ready_count(),
        last_update: state.store.last_update(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(status))
        .route("/health", get(health))
        .route("/api/health", get(health))
        .route("/api/stats", get(stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "1.0.0",
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"version\":\"1.0.0\""));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let Json(response) = health().await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_stats_serialization_camel_case() {
        let response = StatsResponse {
            total_subscribers: 3,
            active_subscribers: 2,
            ready_instruments: 10,
            last_update: None,
            uptime_secs: 5,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["totalSubscribers"], 3);
        assert_eq!(json["activeSubscribers"], 2);
        assert!(json["lastUpdate"].is_null());
    }
}

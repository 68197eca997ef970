pub mod health;
pub mod market;
pub mod subscribers;

use crate::AppState;
use axum::Router;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/market", market::router())
        .nest("/api/subscribers", subscribers::router())
}

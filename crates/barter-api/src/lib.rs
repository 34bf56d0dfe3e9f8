pub mod ads;
pub mod auth;
pub mod error;
pub mod middleware;
pub mod proposals;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use tracing::error;

use barter_db::Database;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::require_auth;

/// Where clients land after an ad is deleted or an ad mutation is refused.
pub const ADS_PATH: &str = "/ads";
/// Where clients land after any proposal status request.
pub const PROPOSALS_PATH: &str = "/proposals";

/// All marketplace routes. Reads are public; anything that changes state
/// goes through [`require_auth`].
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route(ADS_PATH, get(ads::list_ads))
        .route("/ads/{id}", get(ads::get_ad))
        .route("/catalogue", get(ads::catalogue))
        .route(PROPOSALS_PATH, get(proposals::list_proposals))
        .route("/health", get(health))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route(ADS_PATH, post(ads::create_ad))
        .route("/ads/{id}", put(ads::update_ad).delete(ads::delete_ad))
        .route("/me/ads", get(ads::my_ads))
        .route(PROPOSALS_PATH, post(proposals::create_proposal))
        .route("/proposals/{id}/status/{status}", post(proposals::set_status))
        .layer(from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

/// GET /health — liveness check (no auth).
pub async fn health() -> &'static str {
    "ok"
}

/// Run a blocking repository call off the async runtime.
pub(crate) async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> barter_db::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(ApiError::from)
}

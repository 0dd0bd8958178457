use axum::{routing::post, Router};
use std::sync::Arc;

use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;

/// Public auth routes (no authentication required)
pub fn public_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/auth/login/", post(handlers::login))
        .route("/auth/token/refresh/", post(handlers::refresh_token))
        .with_state(service)
}

/// Protected auth routes (require a bearer access token)
pub fn protected_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/auth/logout/", post(handlers::logout))
        .with_state(service)
}

//! Checkout API

pub mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_auth;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    // GET /api/token requires a logged-in user so the widget token cannot be
    // farmed anonymously
    let protected = Router::new()
        .route("/api/token", get(handler::token))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .route("/api/payment", post(handler::process_payment))
        .merge(protected)
}

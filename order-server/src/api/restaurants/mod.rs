//! Restaurants API

pub mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/restaurants", get(handler::list))
        .route("/api/restaurants/{id}", get(handler::get_by_id))
}

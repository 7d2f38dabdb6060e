//! Restaurant API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use shared::models::Restaurant;

use crate::core::ServerState;
use crate::db::repository::{dish, restaurant};
use crate::utils::{AppError, AppResult};

/// GET /api/restaurants - 获取所有餐厅
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Restaurant>>> {
    let restaurants = restaurant::find_all(&state.db.pool).await?;
    Ok(Json(restaurants))
}

/// GET /api/restaurants/{id} - 获取单个餐厅 (含在售菜品)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Restaurant>> {
    let mut restaurant = restaurant::find_by_id(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Restaurant {id} not found")))?;

    restaurant.dishes = dish::find_by_restaurant(&state.db.pool, id).await?;

    Ok(Json(restaurant))
}

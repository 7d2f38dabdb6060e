//! Restaurant Repository

use super::{RepoError, RepoResult};
use shared::models::Restaurant;
use sqlx::SqlitePool;

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Restaurant>> {
    let restaurants = sqlx::query_as::<_, Restaurant>(
        "SELECT id, name, address, phone, owner_email, is_active FROM restaurant WHERE is_active = 1 ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(restaurants)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Restaurant>> {
    let restaurant = sqlx::query_as::<_, Restaurant>(
        "SELECT id, name, address, phone, owner_email, is_active FROM restaurant WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(restaurant)
}

/// Notification recipient for a restaurant's incoming orders
pub async fn owner_email(pool: &SqlitePool, id: i64) -> RepoResult<String> {
    let email: Option<String> =
        sqlx::query_scalar("SELECT owner_email FROM restaurant WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    email.ok_or_else(|| RepoError::NotFound(format!("Restaurant {id} not found")))
}

//! Dish Repository
//!
//! The Catalog Store interface consumed by the cart validator: dishes are
//! read-only here, prices always come from these rows.

use super::RepoResult;
use shared::models::Dish;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, restaurant_id, name, price, is_active";

/// Fetch dishes by id. Missing ids simply don't appear in the result;
/// the caller decides whether that is an error.
pub async fn find_by_ids(pool: &SqlitePool, ids: &[i64]) -> RepoResult<Vec<Dish>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("SELECT {COLUMNS} FROM dish WHERE id IN ({placeholders})");

    let mut query = sqlx::query_as::<_, Dish>(&sql);
    for id in ids {
        query = query.bind(id);
    }

    let dishes = query.fetch_all(pool).await?;
    Ok(dishes)
}

pub async fn find_by_restaurant(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<Dish>> {
    let dishes = sqlx::query_as::<_, Dish>(&format!(
        "SELECT {COLUMNS} FROM dish WHERE restaurant_id = ? AND is_active = 1 ORDER BY name"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(dishes)
}

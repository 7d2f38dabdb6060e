//! Dish Model

use serde::{Deserialize, Serialize};

/// Dish entity - read-only from the checkout flow's perspective.
///
/// `price` is the menu price in euros with two decimal places; all arithmetic
/// on it goes through `Decimal` on the server side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Dish {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub price: f64,
    pub is_active: bool,
}

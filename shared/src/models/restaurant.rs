//! Restaurant Model

use serde::{Deserialize, Serialize};

use super::Dish;

/// Restaurant entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    /// Where order notifications for this restaurant are sent
    pub owner_email: String,
    pub is_active: bool,

    // -- Relations (populated by application code, skipped by FromRow) --

    /// Active dishes, populated by the detail endpoint
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub dishes: Vec<Dish>,
}

//! Order Model
//!
//! Orders are written exclusively by the reconciliation flow, and only after
//! the payment provider has confirmed the charge. `pending` and `failed`
//! exist for operator tooling; the reconciler itself never persists them.

use serde::{Deserialize, Serialize};

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
}

/// Persisted order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    pub customer_last_name: String,
    pub customer_address: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_note: Option<String>,
    /// Amount actually charged, 2 decimal places
    pub total_price: f64,
    pub status: OrderStatus,
    pub restaurant_id: i64,
    /// Provider transaction id from the successful charge
    pub transaction_id: String,
    pub created_at: i64,
}

/// Order line entity - one dish within an order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub dish_id: i64,
    pub quantity: i32,
    /// Menu price at the time of sale
    pub unit_price: f64,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub customer_name: String,
    pub customer_last_name: String,
    pub customer_address: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_note: Option<String>,
    pub total_price: f64,
    pub status: OrderStatus,
    pub restaurant_id: i64,
    pub transaction_id: String,
}

/// Create order line payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineCreate {
    pub dish_id: i64,
    pub quantity: i32,
    pub unit_price: f64,
}

/// Payment attempt status (idempotency bookkeeping)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum AttemptStatus {
    Charging,
    Succeeded,
    Failed,
}

/// Payment attempt entity - one row per client idempotency key.
///
/// Claimed before the gateway is called, completed or failed afterwards, so a
/// client retry can be answered without charging twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PaymentAttempt {
    pub id: i64,
    pub idempotency_key: String,
    pub status: AttemptStatus,
    pub transaction_id: Option<String>,
    pub order_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

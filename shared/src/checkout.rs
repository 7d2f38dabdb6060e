//! Checkout DTOs
//!
//! Wire types for the payment flow. Field names follow what the storefront
//! widget submits (`paymentMethodNonce`, `userData`).

use serde::{Deserialize, Serialize};

/// One cart line as submitted by the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineInput {
    pub dish_id: i64,
    pub quantity: i32,
}

/// Checkout submission - POST /api/payment
///
/// `total_price` is what the client *believes* the cart costs; the server
/// recomputes the figure from the catalog and rejects on disagreement. It is
/// never the amount that gets charged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub total_price: f64,
    pub customer_name: String,
    pub customer_last_name: String,
    pub customer_address: String,
    pub customer_email: String,
    pub customer_phone: String,
    #[serde(default)]
    pub customer_note: Option<String>,
    /// Single-use payment method token from the client-side widget
    #[serde(rename = "paymentMethodNonce")]
    pub payment_method_nonce: String,
    /// Client-generated key for duplicate-submission protection
    #[serde(default)]
    pub idempotency_key: Option<String>,
    #[serde(rename = "userData")]
    pub lines: Vec<CartLineInput>,
}

/// Successful checkout response payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub order_id: i64,
    /// Provider transaction id
    pub transaction: String,
    /// Amount charged, 2 decimal places
    pub total_price: f64,
    /// Dish ids in the order, in submission order
    #[serde(rename = "dish")]
    pub dish_ids: Vec<i64>,
    pub restaurant_id: i64,
}

/// Ephemeral client token for the payment widget - GET /api/token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientToken {
    pub token: String,
}

/// Outcome of a settled charge at the payment provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResult {
    pub transaction_id: String,
    pub success: bool,
    /// Present iff `success` is false
    #[serde(default)]
    pub failure_reason: Option<String>,
    /// Amount the provider actually settled
    pub settled_amount: f64,
}

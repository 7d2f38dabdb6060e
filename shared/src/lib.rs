//! Shared domain types for the ordering platform
//!
//! This crate holds everything the server and external tooling agree on:
//!
//! - **checkout**: request/response DTOs for the payment flow
//! - **models**: database-backed entities (restaurants, dishes, orders)
//! - **util**: ID and timestamp helpers
//!
//! Database derives (`sqlx::FromRow`, `sqlx::Type`) are behind the `db`
//! feature so non-server consumers stay free of sqlx.

pub mod checkout;
pub mod models;
pub mod util;

// Re-export the checkout DTOs for convenience
pub use checkout::{
    CartLineInput, CheckoutReceipt, CheckoutRequest, ClientToken, PaymentResult,
};

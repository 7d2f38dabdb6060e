//! Payment Gateway Client
//!
//! Wraps the third-party payment provider behind the [`PaymentGateway`]
//! trait: token generation for the client-side widget and sale submission
//! with immediate settlement. The production implementation is
//! [`HttpPaymentGateway`]; tests substitute their own.
//!
//! The gateway is constructed from [`GatewayConfig`](crate::core::config::GatewayConfig)
//! and injected where it is needed - there is no process-wide instance.

pub mod http;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::checkout::{ClientToken, PaymentResult};
use thiserror::Error;

pub use http::HttpPaymentGateway;

/// Gateway errors
///
/// A declined card and an unreachable provider are different animals: the
/// first is a definitive "no money moved", the second means the charge may or
/// may not have happened. Callers must treat [`GatewayError::Indeterminate`]
/// as "check the transaction status before retrying".
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The provider processed the request and rejected it (declined card,
    /// invalid nonce, ...). No funds moved.
    #[error("{message}")]
    Provider { code: String, message: String },

    /// The provider could not be reached at all. No funds moved.
    #[error("Payment provider unreachable: {0}")]
    Unavailable(String),

    /// Timeout or unreadable response after the request went out - the
    /// charge outcome is unknown and a blind retry risks a double charge.
    #[error("Charge outcome unknown: {0}")]
    Indeterminate(String),
}

/// Third-party payment provider interface
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Obtain an ephemeral token for the client-side payment widget.
    async fn generate_token(&self) -> Result<ClientToken, GatewayError>;

    /// Submit a sale with immediate settlement.
    ///
    /// `amount` is always the server-computed total; `reference` is echoed
    /// back by the provider and ties the transaction to our attempt record.
    async fn charge(
        &self,
        amount: Decimal,
        nonce: &str,
        reference: &str,
    ) -> Result<PaymentResult, GatewayError>;
}

impl From<GatewayError> for crate::utils::AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Provider { code, message } => {
                crate::utils::AppError::ProviderUnavailable(format!("{code}: {message}"))
            }
            GatewayError::Unavailable(msg) => crate::utils::AppError::ProviderUnavailable(msg),
            GatewayError::Indeterminate(msg) => crate::utils::AppError::PaymentIndeterminate(msg),
        }
    }
}

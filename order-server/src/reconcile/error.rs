//! Checkout error taxonomy
//!
//! Distinguishes "no money moved" failures (validation, decline, provider
//! down) from the one genuinely bad state: charged but unrecorded.

use thiserror::Error;

use crate::cart::ValidationError;
use crate::db::repository::RepoError;
use crate::gateway::GatewayError;
use crate::utils::AppError;

#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Bad input - rejected before any gateway call, no side effects
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The provider rejected the charge; reason passed through verbatim
    #[error("Payment declined: {message}")]
    Declined { code: String, message: String },

    /// The provider could not be reached; no funds moved
    #[error("Payment provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Timeout or ambiguous provider response - the caller must check the
    /// transaction status instead of resubmitting
    #[error("Payment outcome indeterminate: {0}")]
    Indeterminate(String),

    /// The same idempotency key is still being processed
    #[error("A submission with idempotency key {0} is already in flight")]
    DuplicateInFlight(String),

    /// Storage failure before any charge was made
    #[error("Storage error: {0}")]
    Storage(#[from] RepoError),

    /// The charge settled but the order could not be recorded - operator
    /// alert raised, caller must not resubmit
    #[error("Charge {transaction_id} succeeded but the order could not be recorded")]
    ReconciliationRequired { transaction_id: String },
}

impl From<GatewayError> for CheckoutError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Provider { code, message } => CheckoutError::Declined { code, message },
            GatewayError::Unavailable(msg) => CheckoutError::ProviderUnavailable(msg),
            GatewayError::Indeterminate(msg) => CheckoutError::Indeterminate(msg),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Validation(e) => AppError::validation(e.to_string()),
            CheckoutError::Declined { code, message } => {
                AppError::PaymentDeclined { code, message }
            }
            CheckoutError::ProviderUnavailable(msg) => AppError::ProviderUnavailable(msg),
            CheckoutError::Indeterminate(msg) => AppError::PaymentIndeterminate(msg),
            CheckoutError::DuplicateInFlight(key) => AppError::DuplicatePayment(format!(
                "A payment with idempotency key {key} is already being processed"
            )),
            CheckoutError::Storage(e) => e.into(),
            CheckoutError::ReconciliationRequired { transaction_id } => AppError::Internal(format!(
                "Payment {transaction_id} was taken but the order could not be recorded; \
                 support has been notified - do not resubmit"
            )),
        }
    }
}

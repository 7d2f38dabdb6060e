//! HTTP payment provider client
//!
//! JSON client for the provider's REST API. Requests authenticate with the
//! merchant key pair; the charge call carries a bounded timeout and maps a
//! timeout to [`GatewayError::Indeterminate`] rather than a retriable error.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::checkout::{ClientToken, PaymentResult};

use super::{GatewayError, PaymentGateway};
use crate::cart::money;
use crate::core::config::GatewayConfig;

/// Reqwest-backed gateway client
#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    merchant_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, Serialize)]
struct SaleRequest<'a> {
    merchant_id: &'a str,
    /// Decimal amount as a string ("20.00"); never floats on the wire
    amount: String,
    payment_method_nonce: &'a str,
    reference: &'a str,
    submit_for_settlement: bool,
}

#[derive(Debug, Deserialize)]
struct SaleResponse {
    transaction_id: String,
    amount: f64,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl HttpPaymentGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Turn a non-2xx provider response into a `Provider` error, keeping the
    /// provider's own code and message when the body is parseable.
    async fn provider_error(resp: reqwest::Response) -> GatewayError {
        let status = resp.status();
        let body: ProviderErrorBody = resp.json().await.unwrap_or(ProviderErrorBody {
            code: None,
            message: None,
        });
        GatewayError::Provider {
            code: body.code.unwrap_or_else(|| status.as_u16().to_string()),
            message: body
                .message
                .unwrap_or_else(|| format!("Provider returned {status}")),
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn generate_token(&self) -> Result<ClientToken, GatewayError> {
        let resp = match self
            .client
            .post(format!("{}/client_tokens", self.config.base_url))
            .basic_auth(&self.config.public_key, Some(&self.config.private_key))
            .json(&TokenRequest {
                merchant_id: &self.config.merchant_id,
            })
            .timeout(self.config.charge_timeout())
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to reach payment provider for client token");
                return Err(GatewayError::Unavailable(e.to_string()));
            }
        };

        if !resp.status().is_success() {
            return Err(Self::provider_error(resp).await);
        }

        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::Unavailable(format!("Unreadable token response: {e}")))?;

        Ok(ClientToken { token: body.token })
    }

    async fn charge(
        &self,
        amount: Decimal,
        nonce: &str,
        reference: &str,
    ) -> Result<PaymentResult, GatewayError> {
        let request = SaleRequest {
            merchant_id: &self.config.merchant_id,
            amount: money::format_amount(amount),
            payment_method_nonce: nonce,
            reference,
            submit_for_settlement: true,
        };

        let resp = match self
            .client
            .post(format!("{}/transactions", self.config.base_url))
            .basic_auth(&self.config.public_key, Some(&self.config.private_key))
            .json(&request)
            .timeout(self.config.charge_timeout())
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                // The sale request may have reached the provider - outcome unknown
                tracing::error!(
                    reference,
                    timeout_ms = self.config.charge_timeout_ms,
                    "Charge timed out; outcome indeterminate"
                );
                return Err(GatewayError::Indeterminate(format!(
                    "Charge timed out after {}ms",
                    self.config.charge_timeout_ms
                )));
            }
            Err(e) if e.is_connect() => {
                // Never connected - no funds moved
                return Err(GatewayError::Unavailable(e.to_string()));
            }
            Err(e) => {
                // Request may have gone out before the failure - play it safe
                return Err(GatewayError::Indeterminate(e.to_string()));
            }
        };

        if !resp.status().is_success() {
            return Err(Self::provider_error(resp).await);
        }

        // The provider accepted the sale; an unreadable body at this point is
        // indeterminate, not a decline - the money likely moved.
        let sale: SaleResponse = resp.json().await.map_err(|e| {
            GatewayError::Indeterminate(format!("Unreadable sale response: {e}"))
        })?;

        Ok(PaymentResult {
            transaction_id: sale.transaction_id,
            success: true,
            failure_reason: None,
            settled_amount: sale.amount,
        })
    }
}

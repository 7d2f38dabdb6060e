//! Order Reconciler
//!
//! Orchestrates one checkout submission end to end and owns the consistency
//! guarantee: **an order row exists iff the provider confirmed the charge**.
//!
//! # Stages
//!
//! ```text
//! RECEIVED → VALIDATED → CHARGING → PAID → PERSISTED → NOTIFYING → DONE
//!     │           │          │
//!     │           └ REJECTED └ DECLINED (terminal, nothing written)
//! ```
//!
//! Within one submission the sequence is strictly serial: the charge must
//! complete before any persistence starts, and persistence never runs
//! speculatively. Notification dispatch is handed off to the worker channel
//! and runs after (or concurrently with) the response.

pub mod error;

use std::sync::Arc;

use shared::checkout::{CheckoutReceipt, CheckoutRequest, PaymentResult};
use shared::models::{OrderCreate, OrderLineCreate, OrderStatus, SystemIssueCreate};
use sqlx::SqlitePool;

use crate::cart::{self, money};
use crate::db::repository::payment_attempt::ClaimOutcome;
use crate::db::repository::{dish, order, payment_attempt, restaurant, system_issue};
use crate::gateway::{GatewayError, PaymentGateway};
use crate::notify::{NotificationHandle, NotificationJob};

pub use error::CheckoutError;

/// Reconciliation stages for one submission (used for tracing)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Received,
    Validated,
    Charging,
    Paid,
    Persisted,
    Notifying,
    Done,
    Rejected,
    Declined,
}

#[inline]
fn advance(stage: &mut Stage, next: Stage) {
    tracing::debug!(target: "reconcile", from = ?stage, to = ?next, "stage transition");
    *stage = next;
}

/// Orchestrates validate → charge → persist → notify for one submission.
///
/// Dependencies are injected at construction; the reconciler holds no
/// mutable state of its own, so one instance serves all concurrent
/// submissions.
pub struct OrderReconciler {
    pool: SqlitePool,
    gateway: Arc<dyn PaymentGateway>,
    notifications: NotificationHandle,
}

impl OrderReconciler {
    pub fn new(
        pool: SqlitePool,
        gateway: Arc<dyn PaymentGateway>,
        notifications: NotificationHandle,
    ) -> Self {
        Self {
            pool,
            gateway,
            notifications,
        }
    }

    /// Process one checkout submission.
    pub async fn submit(&self, request: CheckoutRequest) -> Result<CheckoutReceipt, CheckoutError> {
        let mut stage = Stage::Received;

        // 1. Resolve the referenced dishes from the catalog
        let mut ids: Vec<i64> = request.lines.iter().map(|l| l.dish_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let dishes = dish::find_by_ids(&self.pool, &ids).await?;

        // 2. Validate and price server-side - the submitted total is only a
        //    cross-check, never the chargeable amount
        let cart = match cart::validate(&request, &dishes) {
            Ok(cart) => cart,
            Err(e) => {
                advance(&mut stage, Stage::Rejected);
                return Err(CheckoutError::Validation(e));
            }
        };
        advance(&mut stage, Stage::Validated);

        // 3. Idempotency: claim the key before any gateway call so a client
        //    retry can never charge twice
        if let Some(key) = request.idempotency_key.as_deref() {
            match payment_attempt::claim(&self.pool, key).await? {
                ClaimOutcome::Fresh => {}
                ClaimOutcome::InFlight => {
                    return Err(CheckoutError::DuplicateInFlight(key.to_string()));
                }
                ClaimOutcome::Completed {
                    transaction_id,
                    order_id,
                } => {
                    tracing::info!(
                        order_id,
                        transaction_id = %transaction_id,
                        "Duplicate submission, replaying stored receipt"
                    );
                    return self.replay_receipt(order_id, &transaction_id).await;
                }
            }
        }

        // 4. Charge - strictly before any persistence
        advance(&mut stage, Stage::Charging);
        let reference = request
            .idempotency_key
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let payment = match self
            .gateway
            .charge(cart.total, &request.payment_method_nonce, &reference)
            .await
        {
            Ok(p) => p,
            Err(e) => {
                advance(&mut stage, Stage::Declined);
                self.release_attempt_on_charge_failure(&request, &e).await;
                return Err(e.into());
            }
        };

        // Gateway implementations return Err on failure, but honor the flag
        // too in case one doesn't
        if !payment.success {
            advance(&mut stage, Stage::Declined);
            if let Some(key) = request.idempotency_key.as_deref() {
                let _ = payment_attempt::fail(&self.pool, key).await;
            }
            return Err(CheckoutError::Declined {
                code: "processor_declined".to_string(),
                message: payment
                    .failure_reason
                    .unwrap_or_else(|| "Charge was not successful".to_string()),
            });
        }
        advance(&mut stage, Stage::Paid);

        // The settled amount must be exactly what we asked for
        if !money::money_eq(payment.settled_amount, money::to_f64(cart.total)) {
            self.raise_reconciliation_alert(
                &payment,
                &request,
                &format!(
                    "settled amount {:.2} differs from computed total {:.2}",
                    payment.settled_amount,
                    money::to_f64(cart.total)
                ),
            )
            .await;
            return Err(CheckoutError::ReconciliationRequired {
                transaction_id: payment.transaction_id.clone(),
            });
        }

        // 5. Persist order + lines in one transaction
        let order_create = OrderCreate {
            customer_name: request.customer_name.clone(),
            customer_last_name: request.customer_last_name.clone(),
            customer_address: request.customer_address.clone(),
            customer_email: request.customer_email.clone(),
            customer_phone: request.customer_phone.clone(),
            customer_note: request.customer_note.clone(),
            total_price: money::to_f64(cart.total),
            status: OrderStatus::Paid,
            restaurant_id: cart.restaurant_id,
            transaction_id: payment.transaction_id.clone(),
        };
        let lines: Vec<OrderLineCreate> = cart
            .lines
            .iter()
            .map(|l| OrderLineCreate {
                dish_id: l.dish_id,
                quantity: l.quantity,
                unit_price: money::to_f64(l.unit_price),
            })
            .collect();

        let order_id = match order::insert_order_with_lines(&self.pool, &order_create, &lines).await
        {
            Ok(id) => id,
            Err(e) => {
                // Money was taken but nothing is recorded - this is the one
                // failure that must reach an operator. The attempt row stays
                // 'charging' on purpose: a retry under the same key gets 409
                // instead of a second charge.
                self.raise_reconciliation_alert(&payment, &request, &e.to_string())
                    .await;
                return Err(CheckoutError::ReconciliationRequired {
                    transaction_id: payment.transaction_id.clone(),
                });
            }
        };
        advance(&mut stage, Stage::Persisted);

        // 6. Record the attempt outcome for future duplicates
        if let Some(key) = request.idempotency_key.as_deref()
            && let Err(e) =
                payment_attempt::complete(&self.pool, key, &payment.transaction_id, order_id).await
        {
            tracing::warn!(order_id, error = %e, "Failed to record idempotency outcome");
        }

        // 7. Fire-and-forget notifications (read-only snapshot of the
        //    committed order; failures never surface to the caller)
        advance(&mut stage, Stage::Notifying);
        self.dispatch_notifications(order_id, cart.restaurant_id).await;

        advance(&mut stage, Stage::Done);
        tracing::info!(
            order_id,
            transaction_id = %payment.transaction_id,
            total = money::to_f64(cart.total),
            "Order reconciled"
        );

        Ok(CheckoutReceipt {
            order_id,
            transaction: payment.transaction_id,
            total_price: money::to_f64(cart.total),
            dish_ids: cart.dish_ids,
            restaurant_id: cart.restaurant_id,
        })
    }

    /// Rebuild the receipt for a key whose first submission already
    /// succeeded, from the persisted order.
    async fn replay_receipt(
        &self,
        order_id: i64,
        transaction_id: &str,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let order = order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| {
                crate::db::repository::RepoError::NotFound(format!("Order {order_id} not found"))
            })?;
        let lines = order::lines_for_order(&self.pool, order_id).await?;

        Ok(CheckoutReceipt {
            order_id,
            transaction: transaction_id.to_string(),
            total_price: order.total_price,
            dish_ids: lines.iter().map(|l| l.dish_id).collect(),
            restaurant_id: order.restaurant_id,
        })
    }

    /// After a failed charge: a definitive decline frees the idempotency key
    /// for retry; an indeterminate outcome keeps it claimed so a blind
    /// resubmission cannot double-charge.
    async fn release_attempt_on_charge_failure(
        &self,
        request: &CheckoutRequest,
        err: &GatewayError,
    ) {
        let Some(key) = request.idempotency_key.as_deref() else {
            return;
        };
        match err {
            GatewayError::Indeterminate(_) => {
                tracing::warn!(
                    idempotency_key = key,
                    "Charge outcome indeterminate; keeping attempt claimed"
                );
            }
            GatewayError::Provider { .. } | GatewayError::Unavailable(_) => {
                if let Err(e) = payment_attempt::fail(&self.pool, key).await {
                    tracing::warn!(idempotency_key = key, error = %e, "Failed to release attempt");
                }
            }
        }
    }

    /// Money moved but the order is not recorded (or recorded wrongly):
    /// log on the reconciliation target and file an operator-visible issue.
    async fn raise_reconciliation_alert(
        &self,
        payment: &PaymentResult,
        request: &CheckoutRequest,
        reason: &str,
    ) {
        tracing::error!(
            target: "reconciliation",
            transaction_id = %payment.transaction_id,
            settled_amount = payment.settled_amount,
            customer_email = %request.customer_email,
            reason,
            "Charge succeeded but order persistence failed - manual reconciliation required"
        );

        let issue = SystemIssueCreate {
            source: "reconciler".to_string(),
            kind: "orphan_charge".to_string(),
            title: format!("Charged but unrecorded: {}", payment.transaction_id),
            description: format!(
                "A charge settled at the payment provider but no order row was written: {reason}. \
                 Refund the transaction or re-enter the order manually."
            ),
            params: serde_json::json!({
                "transaction_id": payment.transaction_id,
                "settled_amount": payment.settled_amount,
                "customer_email": request.customer_email,
                "idempotency_key": request.idempotency_key,
            }),
        };

        if let Err(e) = system_issue::create(&self.pool, issue).await {
            // Nothing left but the log line above
            tracing::error!(
                target: "reconciliation",
                transaction_id = %payment.transaction_id,
                error = %e,
                "Failed to file reconciliation issue"
            );
        }
    }

    /// Queue customer and restaurant e-mails from the committed order row.
    async fn dispatch_notifications(&self, order_id: i64, restaurant_id: i64) {
        let order = match order::find_by_id(&self.pool, order_id).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                tracing::warn!(order_id, "Committed order missing when dispatching notifications");
                return;
            }
            Err(e) => {
                tracing::warn!(order_id, error = %e, "Failed to load order for notifications");
                return;
            }
        };

        self.notifications.enqueue(NotificationJob::CustomerReceipt {
            order: order.clone(),
        });

        match restaurant::owner_email(&self.pool, restaurant_id).await {
            Ok(recipient) => {
                self.notifications
                    .enqueue(NotificationJob::RestaurantOrder { order, recipient });
            }
            Err(e) => {
                tracing::warn!(restaurant_id, error = %e, "No owner email; skipping restaurant notification");
            }
        }
    }
}

#[cfg(test)]
mod tests;

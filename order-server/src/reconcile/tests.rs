//! Reconciler scenario tests
//!
//! Every test runs against an in-memory database with a stub gateway, so the
//! charge/persist ordering and the zero-orders-on-failure invariant are
//! checked against real SQL.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tokio::sync::mpsc;

use shared::checkout::{CartLineInput, CheckoutRequest, ClientToken, PaymentResult};
use shared::models::OrderStatus;

use crate::cart::money;
use crate::db::DbService;
use crate::db::repository::{order, system_issue};
use crate::gateway::{GatewayError, PaymentGateway};
use crate::notify::{self, NotificationJob};

use super::{CheckoutError, OrderReconciler};

// ========== Stub gateway ==========

#[derive(Clone, Copy)]
enum GatewayMode {
    Approve,
    Decline,
    Timeout,
    Unavailable,
}

struct StubGateway {
    mode: GatewayMode,
    charges: Arc<AtomicUsize>,
}

impl StubGateway {
    fn new(mode: GatewayMode) -> (Arc<Self>, Arc<AtomicUsize>) {
        let charges = Arc::new(AtomicUsize::new(0));
        (
            Arc::new(Self {
                mode,
                charges: charges.clone(),
            }),
            charges,
        )
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn generate_token(&self) -> Result<ClientToken, GatewayError> {
        Ok(ClientToken {
            token: "stub-client-token".to_string(),
        })
    }

    async fn charge(
        &self,
        amount: Decimal,
        _nonce: &str,
        _reference: &str,
    ) -> Result<PaymentResult, GatewayError> {
        let n = self.charges.fetch_add(1, Ordering::SeqCst) + 1;
        match self.mode {
            GatewayMode::Approve => Ok(PaymentResult {
                transaction_id: format!("txn-{n}"),
                success: true,
                failure_reason: None,
                settled_amount: money::to_f64(amount),
            }),
            GatewayMode::Decline => Err(GatewayError::Provider {
                code: "2000".to_string(),
                message: "Do Not Honor".to_string(),
            }),
            GatewayMode::Timeout => Err(GatewayError::Indeterminate(
                "Charge timed out after 30000ms".to_string(),
            )),
            GatewayMode::Unavailable => {
                Err(GatewayError::Unavailable("connection refused".to_string()))
            }
        }
    }
}

// ========== Test fixtures ==========

async fn setup(
    mode: GatewayMode,
) -> (
    OrderReconciler,
    SqlitePool,
    Arc<AtomicUsize>,
    mpsc::Receiver<NotificationJob>,
) {
    let db = DbService::open_in_memory().await.unwrap();
    seed_catalog(&db.pool).await;

    let (gateway, charges) = StubGateway::new(mode);
    let (handle, rx) = notify::channel(8);
    let reconciler = OrderReconciler::new(db.pool.clone(), gateway, handle);

    (reconciler, db.pool, charges, rx)
}

async fn seed_catalog(pool: &SqlitePool) {
    sqlx::query(
        "INSERT INTO restaurant (id, name, address, phone, owner_email) VALUES \
         (1, 'Trattoria Roma', 'Via Roma 1, Milano', '+39 02 1234567', 'roma@example.com'), \
         (2, 'Sushi Kaito', 'Via Tokyo 2, Milano', NULL, 'kaito@example.com')",
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO dish (id, restaurant_id, name, price) VALUES \
         (5, 1, 'Margherita', 10.0), \
         (6, 1, 'Diavola', 8.5), \
         (7, 2, 'Nigiri Mix', 14.0)",
    )
    .execute(pool)
    .await
    .unwrap();
}

fn checkout(total: f64, lines: Vec<(i64, i32)>) -> CheckoutRequest {
    CheckoutRequest {
        total_price: total,
        customer_name: "Mario".to_string(),
        customer_last_name: "Rossi".to_string(),
        customer_address: "Via Garibaldi 42, Milano".to_string(),
        customer_email: "mario.rossi@example.com".to_string(),
        customer_phone: "+39 333 1234567".to_string(),
        customer_note: None,
        payment_method_nonce: "fake-valid-nonce".to_string(),
        idempotency_key: None,
        lines: lines
            .into_iter()
            .map(|(dish_id, quantity)| CartLineInput { dish_id, quantity })
            .collect(),
    }
}

// ========== Scenarios ==========

#[tokio::test]
async fn test_successful_checkout_persists_order_and_lines() {
    let (reconciler, pool, charges, _rx) = setup(GatewayMode::Approve).await;

    // cart = [{dish 5, qty 2, price 10.00}] → charge(20.00)
    let receipt = reconciler.submit(checkout(20.0, vec![(5, 2)])).await.unwrap();

    assert_eq!(receipt.total_price, 20.0);
    assert_eq!(receipt.restaurant_id, 1);
    assert_eq!(receipt.dish_ids, vec![5]);
    assert!(receipt.transaction.starts_with("txn-"));
    assert_eq!(charges.load(Ordering::SeqCst), 1);

    // Exactly one order, status paid, total matching the charged amount
    assert_eq!(order::count(&pool).await.unwrap(), 1);
    let stored = order::find_by_id(&pool, receipt.order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, OrderStatus::Paid);
    assert_eq!(stored.total_price, 20.0);
    assert_eq!(stored.transaction_id, receipt.transaction);

    // Exactly len(cart) lines
    let lines = order::lines_for_order(&pool, receipt.order_id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].dish_id, 5);
    assert_eq!(lines[0].quantity, 2);
    assert_eq!(lines[0].unit_price, 10.0);
}

#[tokio::test]
async fn test_successful_checkout_queues_both_notifications() {
    let (reconciler, _pool, _charges, mut rx) = setup(GatewayMode::Approve).await;

    reconciler.submit(checkout(20.0, vec![(5, 2)])).await.unwrap();

    let first = rx.try_recv().unwrap();
    let second = rx.try_recv().unwrap();
    assert!(matches!(first, NotificationJob::CustomerReceipt { .. }));
    match second {
        NotificationJob::RestaurantOrder { recipient, order } => {
            assert_eq!(recipient, "roma@example.com");
            assert_eq!(order.total_price, 20.0);
        }
        other => panic!("Expected restaurant notification, got {other:?}"),
    }
}

#[tokio::test]
async fn test_declined_charge_persists_nothing() {
    let (reconciler, pool, charges, _rx) = setup(GatewayMode::Decline).await;

    let err = reconciler
        .submit(checkout(20.0, vec![(5, 2)]))
        .await
        .unwrap_err();

    // Failure reason passed through verbatim
    match err {
        CheckoutError::Declined { message, .. } => assert_eq!(message, "Do Not Honor"),
        other => panic!("Expected decline, got {other:?}"),
    }
    assert_eq!(charges.load(Ordering::SeqCst), 1);
    assert_eq!(order::count(&pool).await.unwrap(), 0);
    assert_eq!(order::count_lines(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_timeout_is_indeterminate_and_persists_nothing() {
    let (reconciler, pool, _charges, _rx) = setup(GatewayMode::Timeout).await;

    let err = reconciler
        .submit(checkout(20.0, vec![(5, 2)]))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Indeterminate(_)));
    assert_eq!(order::count(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_provider_unavailable_persists_nothing() {
    let (reconciler, pool, _charges, _rx) = setup(GatewayMode::Unavailable).await;

    let err = reconciler
        .submit(checkout(20.0, vec![(5, 2)]))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::ProviderUnavailable(_)));
    assert_eq!(order::count(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_mixed_restaurant_cart_rejected_before_charging() {
    let (reconciler, pool, charges, _rx) = setup(GatewayMode::Approve).await;

    let err = reconciler
        .submit(checkout(24.0, vec![(5, 1), (7, 1)]))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Validation(_)));
    // Rejected carts never reach the gateway
    assert_eq!(charges.load(Ordering::SeqCst), 0);
    assert_eq!(order::count(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_client_total_mismatch_rejected_before_charging() {
    let (reconciler, _pool, charges, _rx) = setup(GatewayMode::Approve).await;

    // Cart is 2 × 10.00 = 20.00 but the client claims 1.00
    let err = reconciler
        .submit(checkout(1.0, vec![(5, 2)]))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Validation(_)));
    assert_eq!(charges.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_idempotent_resubmission_charges_once() {
    let (reconciler, pool, charges, _rx) = setup(GatewayMode::Approve).await;

    let mut request = checkout(20.0, vec![(5, 2)]);
    request.idempotency_key = Some("key-1".to_string());

    let first = reconciler.submit(request.clone()).await.unwrap();
    let second = reconciler.submit(request).await.unwrap();

    assert_eq!(first.order_id, second.order_id);
    assert_eq!(first.transaction, second.transaction);
    assert_eq!(first.total_price, second.total_price);
    assert_eq!(second.dish_ids, vec![5]);

    // One charge, one order - the duplicate was answered from the stored row
    assert_eq!(charges.load(Ordering::SeqCst), 1);
    assert_eq!(order::count(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn test_declined_attempt_can_be_retried_under_same_key() {
    let (reconciler, pool, charges, _rx) = setup(GatewayMode::Decline).await;

    let mut request = checkout(20.0, vec![(5, 2)]);
    request.idempotency_key = Some("key-2".to_string());

    let first = reconciler.submit(request.clone()).await.unwrap_err();
    assert!(matches!(first, CheckoutError::Declined { .. }));

    // A terminal decline frees the key; the retry reaches the gateway again
    let second = reconciler.submit(request).await.unwrap_err();
    assert!(matches!(second, CheckoutError::Declined { .. }));
    assert_eq!(charges.load(Ordering::SeqCst), 2);
    assert_eq!(order::count(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_indeterminate_outcome_blocks_retry_under_same_key() {
    let (reconciler, _pool, charges, _rx) = setup(GatewayMode::Timeout).await;

    let mut request = checkout(20.0, vec![(5, 2)]);
    request.idempotency_key = Some("key-3".to_string());

    let first = reconciler.submit(request.clone()).await.unwrap_err();
    assert!(matches!(first, CheckoutError::Indeterminate(_)));

    // The key stays claimed: a blind retry must not produce a second charge
    let second = reconciler.submit(request).await.unwrap_err();
    assert!(matches!(second, CheckoutError::DuplicateInFlight(_)));
    assert_eq!(charges.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_persistence_failure_after_charge_raises_reconciliation_alert() {
    let (reconciler, pool, charges, _rx) = setup(GatewayMode::Approve).await;

    // Break the order tables after seeding so the insert fails post-charge
    sqlx::query("DROP TABLE order_line").execute(&pool).await.unwrap();
    sqlx::query("DROP TABLE orders").execute(&pool).await.unwrap();

    let err = reconciler
        .submit(checkout(20.0, vec![(5, 2)]))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::ReconciliationRequired { .. }));
    assert_eq!(charges.load(Ordering::SeqCst), 1);

    // The failure is operator-visible, not silently swallowed
    let issues = system_issue::find_pending(&pool).await.unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, "orphan_charge");
    assert!(issues[0].params.contains("txn-1"));
}

#[tokio::test]
async fn test_stopped_notification_worker_does_not_fail_checkout() {
    let (reconciler, pool, _charges, rx) = setup(GatewayMode::Approve).await;

    // Simulate the notification side being down
    drop(rx);

    let receipt = reconciler.submit(checkout(20.0, vec![(5, 2)])).await.unwrap();
    assert_eq!(order::count(&pool).await.unwrap(), 1);
    assert_eq!(receipt.total_price, 20.0);
}

#[tokio::test]
async fn test_multi_line_cart_totals_and_lines() {
    let (reconciler, pool, _charges, _rx) = setup(GatewayMode::Approve).await;

    // 1 × 10.00 + 2 × 8.50 = 27.00
    let receipt = reconciler
        .submit(checkout(27.0, vec![(5, 1), (6, 2)]))
        .await
        .unwrap();

    assert_eq!(receipt.total_price, 27.0);
    let lines = order::lines_for_order(&pool, receipt.order_id).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(order::count_lines(&pool).await.unwrap(), 2);
}

//! Notification Dispatcher
//!
//! 监听通知任务通道，异步发送订单邮件（客户 + 餐厅）。
//! 通过 mpsc 通道与对账流程解耦：入队是非阻塞的，邮件提供商再慢也
//! 不会拖住支付响应，发送失败只记录日志，绝不回滚已提交的订单。

pub mod mailer;

use shared::models::Order;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub use mailer::{HttpMailer, MailError, MailMessage, Mailer};

/// One queued notification
#[derive(Debug, Clone)]
pub enum NotificationJob {
    /// Order confirmation to the customer
    CustomerReceipt { order: Order },
    /// New-order alert to the restaurant owner
    RestaurantOrder { order: Order, recipient: String },
}

/// Cheap-clone sending side of the notification channel
#[derive(Debug, Clone)]
pub struct NotificationHandle {
    tx: mpsc::Sender<NotificationJob>,
}

impl NotificationHandle {
    /// Enqueue a job without blocking. A full or closed queue is logged and
    /// dropped - notification delivery is best-effort by design of the flow.
    pub fn enqueue(&self, job: NotificationJob) {
        match self.tx.try_send(job) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(job)) => {
                tracing::warn!(job = job_label(&job), "Notification queue full, dropping job");
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                tracing::warn!(job = job_label(&job), "Notification worker stopped, dropping job");
            }
        }
    }
}

fn job_label(job: &NotificationJob) -> &'static str {
    match job {
        NotificationJob::CustomerReceipt { .. } => "customer_receipt",
        NotificationJob::RestaurantOrder { .. } => "restaurant_order",
    }
}

/// Create the notification channel
pub fn channel(capacity: usize) -> (NotificationHandle, mpsc::Receiver<NotificationJob>) {
    let (tx, rx) = mpsc::channel(capacity);
    (NotificationHandle { tx }, rx)
}

/// 通知工作者
///
/// 从通道消费任务并通过 [`Mailer`] 发送。发送失败打日志后继续，
/// 不影响订单状态。
pub struct NotificationWorker {
    mailer: Arc<dyn Mailer>,
}

impl NotificationWorker {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// 运行工作者（阻塞直到通道关闭或收到停机信号）
    pub async fn run(
        self,
        mut job_rx: mpsc::Receiver<NotificationJob>,
        shutdown: CancellationToken,
    ) {
        tracing::info!("Notification worker started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Notification worker received shutdown signal");
                    break;
                }
                job = job_rx.recv() => {
                    let Some(job) = job else {
                        tracing::info!("Notification channel closed, worker stopping");
                        break;
                    };
                    self.handle(job).await;
                }
            }
        }
    }

    async fn handle(&self, job: NotificationJob) {
        let (order_id, message) = match &job {
            NotificationJob::CustomerReceipt { order } => {
                (order.id, render_customer_receipt(order))
            }
            NotificationJob::RestaurantOrder { order, recipient } => {
                (order.id, render_restaurant_order(order, recipient))
            }
        };

        if let Err(e) = self.mailer.send(&message).await {
            // Payment success is the user-visible contract, not mail
            // delivery - log and move on.
            tracing::error!(
                target: "notify",
                order_id,
                recipient = %message.to,
                error = %e,
                "Failed to send notification; order is unaffected"
            );
        } else {
            tracing::debug!(order_id, recipient = %message.to, "Notification sent");
        }
    }
}

fn render_customer_receipt(order: &Order) -> MailMessage {
    MailMessage {
        to: order.customer_email.clone(),
        subject: format!("Your order #{} is confirmed", order.id),
        body: format!(
            "Hi {},\n\nThanks for your order! We charged €{:.2} and the \
             restaurant is preparing your food.\n\nDelivery address: {}\n\
             Order reference: {}\n",
            order.customer_name, order.total_price, order.customer_address, order.id
        ),
    }
}

fn render_restaurant_order(order: &Order, recipient: &str) -> MailMessage {
    let note = order
        .customer_note
        .as_deref()
        .map(|n| format!("\nCustomer note: {n}"))
        .unwrap_or_default();
    MailMessage {
        to: recipient.to_string(),
        subject: format!("New paid order #{}", order.id),
        body: format!(
            "A new order has been paid (€{:.2}).\n\nCustomer: {} {}\n\
             Phone: {}\nDeliver to: {}{}\n",
            order.total_price,
            order.customer_name,
            order.customer_last_name,
            order.customer_phone,
            order.customer_address,
            note
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared::models::OrderStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_order() -> Order {
        Order {
            id: 42,
            customer_name: "Mario".to_string(),
            customer_last_name: "Rossi".to_string(),
            customer_address: "Via Roma 1".to_string(),
            customer_email: "mario@example.com".to_string(),
            customer_phone: "+39 02 1234567".to_string(),
            customer_note: Some("No onions".to_string()),
            total_price: 20.0,
            status: OrderStatus::Paid,
            restaurant_id: 1,
            transaction_id: "txn-1".to_string(),
            created_at: 1_700_000_000_000,
        }
    }

    struct CountingMailer {
        sent: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Mailer for CountingMailer {
        async fn send(&self, _message: &MailMessage) -> Result<(), MailError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _message: &MailMessage) -> Result<(), MailError> {
            Err(MailError::Transport("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_worker_delivers_queued_jobs() {
        let sent = Arc::new(AtomicUsize::new(0));

        let (handle, rx) = channel(8);
        let shutdown = CancellationToken::new();
        let worker = NotificationWorker::new(Arc::new(CountingMailer { sent: sent.clone() }));

        handle.enqueue(NotificationJob::CustomerReceipt {
            order: test_order(),
        });
        handle.enqueue(NotificationJob::RestaurantOrder {
            order: test_order(),
            recipient: "owner@example.com".to_string(),
        });
        drop(handle); // close the channel so the worker drains and stops

        worker.run(rx, shutdown).await;

        assert_eq!(sent.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_mailer_failure_does_not_stop_worker() {
        let (handle, rx) = channel(8);
        let shutdown = CancellationToken::new();
        let worker = NotificationWorker::new(Arc::new(FailingMailer));

        handle.enqueue(NotificationJob::CustomerReceipt {
            order: test_order(),
        });
        drop(handle);

        // Must complete without panicking even though every send fails
        worker.run(rx, shutdown).await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_worker() {
        let (_handle, rx) = channel(8);
        let shutdown = CancellationToken::new();
        let worker = NotificationWorker::new(Arc::new(FailingMailer));

        shutdown.cancel();
        worker.run(rx, shutdown).await; // returns promptly
    }

    #[test]
    fn test_templates_mention_order_and_amount() {
        let order = test_order();
        let customer = render_customer_receipt(&order);
        assert_eq!(customer.to, "mario@example.com");
        assert!(customer.subject.contains("42"));
        assert!(customer.body.contains("20.00"));

        let restaurant = render_restaurant_order(&order, "owner@example.com");
        assert_eq!(restaurant.to, "owner@example.com");
        assert!(restaurant.body.contains("No onions"));
    }
}

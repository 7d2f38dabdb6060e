use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::gateway::{HttpPaymentGateway, PaymentGateway};
use crate::notify::{
    HttpMailer, Mailer, NotificationHandle, NotificationJob, NotificationWorker,
};
use crate::reconcile::OrderReconciler;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | SQLite 连接池 |
/// | gateway | 支付网关客户端 (注入，可替换) |
/// | jwt_service | JWT 认证服务 |
/// | notifications | 通知队列发送端 |
/// | reconciler | 订单-支付对账器 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 数据库服务
    pub db: DbService,
    /// 支付网关客户端
    pub gateway: Arc<dyn PaymentGateway>,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
    /// 通知队列发送端
    pub notifications: NotificationHandle,
    /// 订单对账器
    pub reconciler: Arc<OrderReconciler>,
    /// 停机信号 (后台任务监听)
    pub shutdown: CancellationToken,
    // 通知工作者在 start_background_tasks 时被取走并 spawn
    worker: Arc<Mutex<Option<(NotificationWorker, mpsc::Receiver<NotificationJob>)>>>,
}

impl ServerState {
    /// 初始化服务器状态 (生产实现: HTTP 网关 + HTTP 邮件)
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        let db = DbService::new(&config.database_path).await?;
        let gateway: Arc<dyn PaymentGateway> =
            Arc::new(HttpPaymentGateway::new(config.gateway.clone()));
        let mailer: Arc<dyn Mailer> = Arc::new(HttpMailer::new(config.mail.clone()));

        Ok(Self::assemble(config.clone(), db, gateway, mailer))
    }

    /// 手动装配状态 - 依赖全部注入，测试可以替换网关和邮件实现
    pub fn assemble(
        config: Config,
        db: DbService,
        gateway: Arc<dyn PaymentGateway>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let (notifications, job_rx) = crate::notify::channel(config.notify_queue_size);
        let worker = NotificationWorker::new(mailer);
        let reconciler = Arc::new(OrderReconciler::new(
            db.pool.clone(),
            gateway.clone(),
            notifications.clone(),
        ));
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));

        Self {
            config,
            db,
            gateway,
            jwt_service,
            notifications,
            reconciler,
            shutdown: CancellationToken::new(),
            worker: Arc::new(Mutex::new(Some((worker, job_rx)))),
        }
    }

    /// 启动后台任务 (幂等: 只有第一次调用会 spawn)
    pub async fn start_background_tasks(&self) {
        if let Some((worker, job_rx)) = self.worker.lock().await.take() {
            let shutdown = self.shutdown.clone();
            tokio::spawn(async move {
                worker.run(job_rx, shutdown).await;
            });
        }
    }
}

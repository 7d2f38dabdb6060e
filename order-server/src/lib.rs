//! Order Server - 餐厅在线下单与支付对账服务
//!
//! # 架构概述
//!
//! 本模块是订单服务的主入口，提供以下核心功能：
//!
//! - **支付网关** (`gateway`): 第三方支付提供商客户端 (token + charge)
//! - **购物车校验** (`cart`): 服务端重新计价与校验
//! - **订单对账** (`reconcile`): 先扣款、后落库的一致性流程
//! - **通知分发** (`notify`): 异步邮件通知 (客户 + 餐厅)
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! order-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── auth/          # JWT 认证
//! ├── cart/          # 购物车校验与计价
//! ├── gateway/       # 支付网关客户端
//! ├── reconcile/     # 订单-支付对账
//! ├── notify/        # 邮件通知工作者
//! ├── db/            # 数据库层
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod cart;
pub mod core;
pub mod db;
pub mod gateway;
pub mod notify;
pub mod reconcile;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use gateway::PaymentGateway;
pub use reconcile::OrderReconciler;
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env` and initialize logging. Called once from `main`.
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    // .env 不存在不算错误 (生产环境直接用环境变量)
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ____          __
  / __ \________/ /__  _____
 / / / / ___/ __  / _ \/ ___/
/ /_/ / /  / /_/ /  __/ /
\____/_/   \__,_/\___/_/
   _____
  / ___/___  ______   _____  _____
  \__ \/ _ \/ ___/ | / / _ \/ ___/
 ___/ /  __/ /   | |/ /  __/ /
/____/\___/_/    |___/\___/_/
    "#
    );
}

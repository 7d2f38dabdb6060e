use crate::auth::JwtConfig;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | DATABASE_PATH | order-server.db | SQLite 数据库文件 |
/// | ENVIRONMENT | development | 运行环境 |
/// | GATEWAY_ENVIRONMENT | sandbox | 支付网关环境 |
/// | GATEWAY_URL | http://localhost:4001 | 支付网关地址 |
/// | GATEWAY_MERCHANT_ID | - | 商户 ID |
/// | GATEWAY_PUBLIC_KEY / GATEWAY_PRIVATE_KEY | - | 商户密钥对 |
/// | CHARGE_TIMEOUT_MS | 30000 | 扣款请求超时(毫秒) |
/// | MAIL_API_URL | http://localhost:4002 | 邮件提供商地址 |
/// | MAIL_API_KEY | - | 邮件提供商密钥 |
/// | MAIL_FROM | orders@example.com | 发件地址 |
/// | NOTIFY_QUEUE_SIZE | 256 | 通知队列长度 |
///
/// # 示例
///
/// ```ignore
/// HTTP_PORT=8080 GATEWAY_URL=https://payments.example.com cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// SQLite 数据库文件路径
    pub database_path: String,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 支付网关配置
    pub gateway: GatewayConfig,
    /// 邮件提供商配置
    pub mail: MailConfig,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 通知队列长度 (满了直接丢弃并告警)
    pub notify_queue_size: usize,
}

/// 支付网关配置 - 注入给 [`HttpPaymentGateway`](crate::gateway::HttpPaymentGateway)，
/// 不存在进程级单例
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// 网关环境: sandbox | production
    pub environment: String,
    /// 网关 API 地址
    pub base_url: String,
    /// 商户 ID
    pub merchant_id: String,
    /// 公钥 (basic auth 用户名)
    pub public_key: String,
    /// 私钥 (basic auth 密码)
    pub private_key: String,
    /// 扣款请求超时 (毫秒)。超时结果视为"不确定"，不是可重试失败
    pub charge_timeout_ms: u64,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self {
            environment: std::env::var("GATEWAY_ENVIRONMENT")
                .unwrap_or_else(|_| "sandbox".into()),
            base_url: std::env::var("GATEWAY_URL")
                .unwrap_or_else(|_| "http://localhost:4001".into()),
            merchant_id: std::env::var("GATEWAY_MERCHANT_ID").unwrap_or_default(),
            public_key: std::env::var("GATEWAY_PUBLIC_KEY").unwrap_or_default(),
            private_key: std::env::var("GATEWAY_PRIVATE_KEY").unwrap_or_default(),
            charge_timeout_ms: std::env::var("CHARGE_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
        }
    }

    pub fn charge_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.charge_timeout_ms)
    }
}

/// 邮件提供商配置
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// 邮件 API 地址
    pub api_url: String,
    /// API 密钥
    pub api_key: String,
    /// 发件地址
    pub from_address: String,
}

impl MailConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("MAIL_API_URL")
                .unwrap_or_else(|_| "http://localhost:4002".into()),
            api_key: std::env::var("MAIL_API_KEY").unwrap_or_default(),
            from_address: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "orders@example.com".into()),
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "order-server.db".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            gateway: GatewayConfig::from_env(),
            mail: MailConfig::from_env(),
            jwt: JwtConfig::default(),
            notify_queue_size: std::env::var("NOTIFY_QUEUE_SIZE")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(256),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(database_path: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.database_path = database_path.into();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

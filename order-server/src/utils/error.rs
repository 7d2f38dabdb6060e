//! 统一错误处理
//!
//! 提供应用级错误类型和响应结构：
//! - [`AppError`] - 应用错误枚举
//! - [`AppResponse`] - API 响应结构
//!
//! # 错误码规范
//!
//! | 前缀 | 分类 | 示例 |
//! |------|------|------|
//! | E1xxx | 校验错误 | E1001 购物车校验失败 |
//! | E2xxx | 支付错误 | E2001 扣款被拒 |
//! | E3xxx | 认证错误 | E3001 未登录 |
//! | E9xxx | 系统错误 | E9002 数据库错误 |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// API 统一响应结构
///
/// ```json
/// {
///   "code": "E0000",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// 错误码 (E0000 表示成功)
    pub code: String,
    /// 消息
    pub message: String,
    /// 响应数据
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 应用错误枚举
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 认证错误 (401) ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    // ========== 业务逻辑错误 (4xx) ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// 支付提供商拒绝扣款 (402)，reason 原样透传给调用方
    #[error("Payment declined: {message}")]
    PaymentDeclined { code: String, message: String },

    /// 支付提供商不可达 (502)
    #[error("Payment provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// 扣款结果不确定 (502)，调用方必须先查询交易状态再决定是否重试
    #[error("Payment outcome indeterminate: {0}")]
    PaymentIndeterminate(String),

    /// 幂等键对应的请求仍在处理中 (409)
    #[error("Duplicate payment submission: {0}")]
    DuplicatePayment(String),

    // ========== 系统错误 (5xx) ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, data) = match &self {
            // Authentication errors (401)
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "E3001",
                "Please login first".to_string(),
                None,
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "E3003",
                "Token expired".to_string(),
                None,
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "E3002",
                "Invalid token".to_string(),
                None,
            ),

            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone(), None),

            // Validation (422)
            AppError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "E1001", msg.clone(), None)
            }

            // Payment declined (402) - failure reason passed through verbatim
            AppError::PaymentDeclined { code, message } => (
                StatusCode::PAYMENT_REQUIRED,
                "E2001",
                message.clone(),
                Some(serde_json::json!({ "provider_code": code })),
            ),

            // Provider unreachable (502)
            AppError::ProviderUnavailable(msg) => {
                (StatusCode::BAD_GATEWAY, "E2002", msg.clone(), None)
            }

            // Indeterminate outcome (502) - tell the caller NOT to resubmit blindly
            AppError::PaymentIndeterminate(msg) => (
                StatusCode::BAD_GATEWAY,
                "E2003",
                format!(
                    "{msg}. Do not resubmit; verify the transaction status first"
                ),
                Some(serde_json::json!({ "indeterminate": true })),
            ),

            // Duplicate in-flight submission (409)
            AppError::DuplicatePayment(msg) => (StatusCode::CONFLICT, "E2004", msg.clone(), None),

            // Database errors (500)
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002",
                    "Database error".to_string(),
                    None,
                )
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(AppResponse::<serde_json::Value> {
            code: code.to_string(),
            message,
            data,
        });

        (status, body).into_response()
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: "Success".to_string(),
        data: Some(data),
    })
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: message.into(),
        data: Some(data),
    })
}

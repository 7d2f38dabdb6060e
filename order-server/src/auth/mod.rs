//! 认证模块
//!
//! 验证外部认证服务签发的 JWT：
//! - [`JwtService`] - JWT 令牌验证
//! - [`CurrentUser`] - 当前用户上下文
//! - [`require_auth`] - 认证中间件 (保护 /api/token)
//!
//! 本服务不做登录：令牌由外部认证服务签发，这里只负责校验。

pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;

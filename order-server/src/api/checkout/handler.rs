//! Checkout API Handlers

use axum::{Extension, Json, extract::State};

use shared::checkout::{CheckoutReceipt, CheckoutRequest, ClientToken};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{AppError, AppResponse, AppResult, ok_with_message};

/// POST /api/payment - 提交购物车并扣款
///
/// 成功: 200 + 订单回执。失败走真实状态码:
/// 422 校验失败 / 402 扣款被拒 / 409 重复提交 / 502 网关不可用或结果不确定。
pub async fn process_payment(
    State(state): State<ServerState>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<AppResponse<CheckoutReceipt>>> {
    let receipt = state
        .reconciler
        .submit(payload)
        .await
        .map_err(AppError::from)?;
    Ok(ok_with_message(receipt, "Payment successful"))
}

/// GET /api/token - 获取支付控件的客户端令牌 (需要登录)
pub async fn token(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ClientToken>> {
    tracing::debug!(user = %user.username, "Issuing payment client token");
    let token = state
        .gateway
        .generate_token()
        .await
        .map_err(AppError::from)?;
    Ok(Json(token))
}

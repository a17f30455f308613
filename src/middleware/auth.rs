use axum::{body::Body, http::Request, middleware::Next, response::Response};

use crate::error::AppError;

/// 网关写入的调用方身份
pub const USER_ID_HEADER: &str = "x-user-id";

/// 当前请求的调用方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i64);

/// 从网关传来的请求头解析调用方，缺失或无效时拒绝请求
pub async fn auth_middleware(mut request: Request<Body>, next: Next) -> Result<Response, AppError> {
    let user_id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|id| *id > 0);

    match user_id {
        Some(user_id) => {
            request.extensions_mut().insert(CurrentUser(user_id));
            Ok(next.run(request).await)
        }
        None => Err(AppError::Unauthorized),
    }
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::cache::CacheError;
use crate::database::StoreError;
use crate::utils::{ApiResponse, error_codes, error_to_api_response};

/// 服务层错误
///
/// 缓存写失败不会出现在这里：它们在发生处记录日志后被吞掉。
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("access denied")]
    AccessDenied,
    #[error("unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// 业务错误码
    pub fn code(&self) -> i32 {
        match self {
            AppError::Validation(_) => error_codes::VALIDATION_ERROR,
            AppError::NotFound(_) => error_codes::NOT_FOUND,
            AppError::AccessDenied => error_codes::PERMISSION_DENIED,
            AppError::Unauthorized => error_codes::AUTH_FAILED,
            AppError::Store(_) | AppError::Cache(_) => error_codes::INTERNAL_ERROR,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AccessDenied => StatusCode::FORBIDDEN,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Store(_) | AppError::Cache(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回给调用方的消息，内部错误不暴露细节
    pub fn message(&self) -> String {
        match self {
            AppError::Store(_) => "数据库错误".to_string(),
            AppError::Cache(_) => "缓存服务错误".to_string(),
            other => other.to_string(),
        }
    }

    /// 转换为 handler 的返回值，内部错误在这里记录完整原因
    pub fn to_api_response<T>(&self) -> (StatusCode, Json<ApiResponse<T>>) {
        if self.status().is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (
            self.status(),
            error_to_api_response(self.code(), self.message()),
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_response::<()>().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_envelope_codes() {
        assert_eq!(AppError::validation("bad").code(), 1000);
        assert_eq!(AppError::Unauthorized.code(), 1002);
        assert_eq!(AppError::AccessDenied.code(), 1003);
        assert_eq!(AppError::NotFound("article").code(), 1004);

        let store = AppError::from(StoreError::Unavailable("down".into()));
        assert_eq!(store.code(), 5000);
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(store.message(), "数据库错误");
    }
}

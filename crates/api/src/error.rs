//! # API 统一错误处理
//!
//! 将服务层的错误类型统一映射到 HTTP 状态码与 JSON 响应体。

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use btcdash_core::market::error::FeedError;
use btcdash_service::error::ServiceError;
use thiserror::Error;

use crate::types::ApiErrorResponse;

/// API 层统一错误枚举
#[derive(Error, Debug)]
pub enum ApiError {
    /// 请求参数错误 (400)
    #[error("请求参数错误: {0}")]
    BadRequest(String),

    /// 资源未找到 (404)
    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 上游价格服务不可用或返回非法数据 (502)
    #[error("上游服务错误: {0}")]
    BadGateway(String),

    /// 下层业务错误 (500)
    #[error("内部服务错误: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 将 `ApiError` 转换为 axum 的 HTTP 响应
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => {
                tracing::warn!("Rejected request ({}): {}", status, msg);
                msg
            }
            ApiError::BadGateway(msg) => {
                tracing::error!("上游服务错误: {}", msg);
                msg
            }
            ApiError::Internal(msg) => {
                // 内部错误只记录日志，不向客户端透传细节
                tracing::error!("内部服务错误: {}", msg);
                "An internal error occurred".to_string()
            }
        };

        let body = Json(ApiErrorResponse::from_msg(message));
        (status, body).into_response()
    }
}

/// 从 `ServiceError` 转换
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Feed(FeedError::Network(msg)) => {
                ApiError::BadGateway(format!("Price feed unreachable: {}", msg))
            }
            ServiceError::Feed(FeedError::MalformedResponse(msg)) => {
                ApiError::BadGateway(format!("Price feed returned malformed data: {}", msg))
            }
            ServiceError::Store(e) => ApiError::Internal(e.to_string()),
            ServiceError::EmptyDataset => ApiError::NotFound(
                "No historic price data available; load /bitcoin-historic first".to_string(),
            ),
            ServiceError::InvalidQuery(msg) => ApiError::BadRequest(msg),
            ServiceError::InvalidSchedule(msg) => ApiError::Internal(msg),
        }
    }
}

/// 从查询参数解析失败转换
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use btcdash_core::store::error::StoreError;

    #[test]
    fn test_service_errors_map_to_status_codes() {
        let cases = vec![
            (ServiceError::Feed(FeedError::Network("timeout".into())), StatusCode::BAD_GATEWAY),
            (
                ServiceError::Feed(FeedError::MalformedResponse("missing USD".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ServiceError::Store(StoreError::Database("locked".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ServiceError::EmptyDataset, StatusCode::NOT_FOUND),
            (ServiceError::InvalidQuery("month".into()), StatusCode::BAD_REQUEST),
            (
                ServiceError::InvalidSchedule("period".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_internal_error_hides_details() {
        let response =
            ApiError::from(ServiceError::Store(StoreError::Database("secret path".into())))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

//! # 实时价格路由控制器
//!
//! 实现 `/bitcoin-price` 与 `/bitcoin-data` 两个接口。

use axum::Json;
use axum::extract::State;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, DataResponse, PriceResponse, SnapshotResponse};

/// 抓取当前比特币价格
///
/// 向价格指数服务发起一次请求，将 USD/GBP/EUR 报价写入存储后只返回美元价格。
#[utoipa::path(
    get,
    path = "/bitcoin-price",
    tag = "价格 (Price)",
    responses(
        (status = 200, description = "抓取并落库成功", body = PriceResponse),
        (status = 502, description = "上游价格服务不可用或数据非法", body = ApiErrorResponse),
        (status = 500, description = "存储错误", body = ApiErrorResponse)
    )
)]
pub async fn get_bitcoin_price(
    State(state): State<AppState>,
) -> Result<Json<PriceResponse>, ApiError> {
    let price = state.price_service.current_usd_price().await?;
    Ok(Json(PriceResponse { price }))
}

/// 列出全部已落库的价格快照
#[utoipa::path(
    get,
    path = "/bitcoin-data",
    tag = "价格 (Price)",
    responses(
        (status = 200, description = "按时间升序的快照列表", body = DataResponse<SnapshotResponse>),
        (status = 500, description = "存储错误", body = ApiErrorResponse)
    )
)]
pub async fn get_bitcoin_data(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<SnapshotResponse>>, ApiError> {
    let snapshots = state.price_service.snapshots().await?;
    Ok(Json(DataResponse::new(
        snapshots.into_iter().map(Into::into).collect(),
    )))
}

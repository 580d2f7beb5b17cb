//! # 历史行情路由控制器
//!
//! 历史收盘价加载、KPI 统计与按月切片查询。

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use btcdash_service::historic::HistoricQuery;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{
    ApiErrorResponse, DataResponse, HistoricDayResponse, HistoricMonthQuery,
    HistoricPointResponse, KpiQuery, KpiResponse,
};

/// 加载历史收盘价
///
/// 抓取配置区间内的每日收盘价并按日期 Upsert，随后返回全量历史数据。
/// 重复调用不会产生重复记录。
#[utoipa::path(
    get,
    path = "/bitcoin-historic",
    tag = "历史 (Historic)",
    responses(
        (status = 200, description = "全量历史数据 (按日期升序)", body = DataResponse<HistoricPointResponse>),
        (status = 502, description = "上游价格服务不可用或数据非法", body = ApiErrorResponse),
        (status = 500, description = "存储错误", body = ApiErrorResponse)
    )
)]
pub async fn get_bitcoin_historic(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<HistoricPointResponse>>, ApiError> {
    let points = state.price_service.load_historic().await?;
    Ok(Json(DataResponse::new(
        points.into_iter().map(Into::into).collect(),
    )))
}

/// 计算历史价格 KPI
///
/// 返回均价、最低价、最高价、波动率 (样本标准差) 以及关注年份内的最低/最高价。
#[utoipa::path(
    get,
    path = "/bitcoin-kpis",
    tag = "历史 (Historic)",
    params(KpiQuery),
    responses(
        (status = 200, description = "KPI 统计结果", body = KpiResponse),
        (status = 400, description = "参数非法", body = ApiErrorResponse),
        (status = 404, description = "尚未加载任何历史数据", body = ApiErrorResponse),
        (status = 500, description = "存储错误", body = ApiErrorResponse)
    )
)]
pub async fn get_bitcoin_kpis(
    State(state): State<AppState>,
    query: Result<Query<KpiQuery>, QueryRejection>,
) -> Result<Json<KpiResponse>, ApiError> {
    let Query(query) = query?;
    let summary = state.price_service.kpis(query.year).await?;
    Ok(Json(summary.into()))
}

/// 按年月查询历史数据
#[utoipa::path(
    get,
    path = "/get-historic",
    tag = "历史 (Historic)",
    params(HistoricMonthQuery),
    responses(
        (status = 200, description = "该月的每日收盘价，无数据时为空数组", body = Vec<HistoricDayResponse>),
        (status = 400, description = "年份或月份非法", body = ApiErrorResponse),
        (status = 500, description = "存储错误", body = ApiErrorResponse)
    )
)]
pub async fn get_historic(
    State(state): State<AppState>,
    query: Result<Query<HistoricMonthQuery>, QueryRejection>,
) -> Result<Json<Vec<HistoricDayResponse>>, ApiError> {
    let Query(query) = query?;
    let points = state
        .price_service
        .historic_month(HistoricQuery::new(query.year, query.month))
        .await?;
    Ok(Json(points.into_iter().map(Into::into).collect()))
}

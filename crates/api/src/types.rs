//! # DTO (Data Transfer Object) 层
//!
//! 将内部领域模型转化为面向前端 JSON 输出的轻量结构体。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use btcdash_core::market::entity::{HistoricPricePoint, PriceSnapshot};
use btcdash_service::kpi::KpiSummary;

// ============================================================
//  实时价格 DTO
// ============================================================

/// 当前美元价格 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PriceResponse {
    /// 最新抓取的 USD 价格
    #[schema(example = 29000.25)]
    pub price: f64,
}

/// 价格快照 DTO，字段名与前端约定保持一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SnapshotResponse {
    /// 存储层生成的记录标识
    #[serde(rename = "_id")]
    #[schema(example = "1f0c6a52-8d0e-4b8e-9a53-7d1c0b1a2f3e")]
    pub id: String,
    /// 报价更新时间 (ISO 8601)
    #[schema(example = "2023-05-06T12:00:00+00:00")]
    pub time: String,
    #[serde(rename = "USD")]
    #[schema(example = 29000.25)]
    pub usd: f64,
    #[serde(rename = "GBP")]
    #[schema(example = 23000.5)]
    pub gbp: f64,
    #[serde(rename = "EUR")]
    #[schema(example = 26000.75)]
    pub eur: f64,
}

// ============================================================
//  历史数据 DTO
// ============================================================

/// 历史收盘价 DTO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistoricPointResponse {
    /// 日期 (YYYY-MM-DD)
    #[schema(example = "2021-06-15")]
    pub time: String,
    #[schema(example = 35000.5)]
    pub price: f64,
}

/// 月度切片中的单日数据 DTO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistoricDayResponse {
    #[schema(example = 35000.5)]
    pub price: f64,
    /// 四位年份
    #[schema(example = "2021")]
    pub year: String,
    /// 两位月份 (补零)
    #[schema(example = "06")]
    pub month: String,
    /// 两位日期 (补零)
    #[schema(example = "15")]
    pub day: String,
}

/// KPI 统计 DTO，数值统一保留两位小数并以字符串输出
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KpiResponse {
    #[schema(example = "116.67")]
    pub avg_price: String,
    #[schema(example = "50")]
    pub min_price: String,
    #[schema(example = "200")]
    pub max_price: String,
    /// 样本标准差
    #[schema(example = "76.38")]
    pub volatility: String,
    /// 关注年份内的最低价，该年无数据时为 null
    #[schema(example = "100")]
    pub min_two: Option<String>,
    /// 关注年份内的最高价，该年无数据时为 null
    #[schema(example = "200")]
    pub max_two: Option<String>,
}

/// `/get-historic` 查询参数
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoricMonthQuery {
    /// 公历年份
    #[param(example = 2021)]
    pub year: i32,
    /// 月份 (1-12)
    #[param(example = 6)]
    pub month: i32,
}

/// `/bitcoin-kpis` 查询参数
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct KpiQuery {
    /// 覆盖默认关注年份
    #[param(example = 2022)]
    pub year: Option<i32>,
}

// ============================================================
//  通用响应 DTO
// ============================================================

/// 列表响应包装器：`{"data": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DataResponse<T: Serialize + ToSchema> {
    pub data: Vec<T>,
}

impl<T: Serialize + ToSchema> DataResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }
}

/// 构建失败响应 (不含泛型载荷)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 错误描述信息
    pub error: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

// ============================================================
//  领域模型 → DTO 惯用转换 (impl From<T>)
// ============================================================

/// 保留两位小数 (银行家舍入) 并去掉末尾的 0。
pub fn to_price_text(value: f64) -> String {
    let decimal = Decimal::from_f64_retain(value).unwrap_or_else(|| {
        tracing::warn!("Price {} is not representable as a decimal, rendering as 0", value);
        Decimal::ZERO
    });
    decimal
        .round_dp(2)
        .normalize()
        .to_string()
}

impl From<PriceSnapshot> for SnapshotResponse {
    fn from(s: PriceSnapshot) -> Self {
        Self {
            id: s.id,
            time: s.time.to_rfc3339(),
            usd: s.usd,
            gbp: s.gbp,
            eur: s.eur,
        }
    }
}

impl From<HistoricPricePoint> for HistoricPointResponse {
    fn from(p: HistoricPricePoint) -> Self {
        Self {
            time: p.time.format("%Y-%m-%d").to_string(),
            price: p.price,
        }
    }
}

impl From<HistoricPricePoint> for HistoricDayResponse {
    fn from(p: HistoricPricePoint) -> Self {
        Self {
            price: p.price,
            year: p.time.format("%Y").to_string(),
            month: p.time.format("%m").to_string(),
            day: p.time.format("%d").to_string(),
        }
    }
}

impl From<KpiSummary> for KpiResponse {
    fn from(k: KpiSummary) -> Self {
        Self {
            avg_price: to_price_text(k.avg),
            min_price: to_price_text(k.min),
            max_price: to_price_text(k.max),
            volatility: to_price_text(k.volatility),
            min_two: k.focus_min.map(to_price_text),
            max_two: k.focus_max.map(to_price_text),
        }
    }
}

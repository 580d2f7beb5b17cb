use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 从价格指数接口抓取并归一化后的实时报价，尚未持久化。
///
/// # Invariants
/// - `usd` / `gbp` / `eur` 均为非负有限浮点数。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    // 上游报价的更新时间
    pub time: DateTime<Utc>,
    // 美元价格
    pub usd: f64,
    // 英镑价格
    pub gbp: f64,
    // 欧元价格
    pub eur: f64,
}

impl PriceQuote {
    /// 三个币种的报价是否全部为非负有限值。
    pub fn is_valid(&self) -> bool {
        [self.usd, self.gbp, self.eur]
            .iter()
            .all(|rate| rate.is_finite() && *rate >= 0.0)
    }
}

/// # Summary
/// 已落库的比特币价格快照，每次抓取生成一条，写入后不可修改。
///
/// # Invariants
/// - `id` 由存储层生成，全局唯一。
/// - 价格字段满足 `PriceQuote` 的约束。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    // 存储层生成的标识
    pub id: String,
    pub time: DateTime<Utc>,
    pub usd: f64,
    pub gbp: f64,
    pub eur: f64,
}

impl PriceSnapshot {
    /// 以存储层生成的标识包装一条报价。
    pub fn from_quote(id: impl Into<String>, quote: &PriceQuote) -> Self {
        Self {
            id: id.into(),
            time: quote.time,
            usd: quote.usd,
            gbp: quote.gbp,
            eur: quote.eur,
        }
    }
}

/// # Summary
/// 历史收盘价序列中的单日数据点。
///
/// # Invariants
/// - 每个自然日至多一条 (存储层以 `time` 为主键)。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricPricePoint {
    // 交易日期，序列化为 "YYYY-MM-DD"
    pub time: NaiveDate,
    // 当日收盘价 (USD)
    pub price: f64,
}

use crate::market::entity::{HistoricPricePoint, PriceQuote};
use crate::market::error::FeedError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// # Summary
/// 比特币价格数据源契约，屏蔽具体的价格指数服务商。
///
/// # Invariants
/// - 实现者不做任何重试，失败立即以 `FeedError` 返回。
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// # Summary
    /// 获取当前的比特币报价 (USD / GBP / EUR)。
    ///
    /// # Logic
    /// 1. 发起单次出站请求。
    /// 2. 将上游 JSON 归一化为 `PriceQuote`。
    ///
    /// # Returns
    /// 成功返回报价，网络或格式问题返回 `FeedError`。
    async fn current_price(&self) -> Result<PriceQuote, FeedError>;

    /// # Summary
    /// 获取闭区间 `[start, end]` 内的每日收盘价。
    ///
    /// # Arguments
    /// * `start`: 起始日期 (含)。
    /// * `end`: 结束日期 (含)。
    ///
    /// # Returns
    /// 按日期升序排列的数据点列表。
    async fn historical_close(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HistoricPricePoint>, FeedError>;
}

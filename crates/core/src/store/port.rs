use super::error::StoreError;
use crate::market::entity::{HistoricPricePoint, PriceQuote, PriceSnapshot};
use async_trait::async_trait;
use chrono::NaiveDate;

/// # Summary
/// 价格数据存储接口，负责 `bitcoin_prices` 与 `bitcoin_historic` 两个集合的读写。
///
/// # Invariants
/// - 快照只追加，不提供更新或删除。
/// - 历史数据以日期为唯一键，重复写入同一日期时覆盖旧值。
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// # Summary
    /// 追加一条实时报价快照。
    ///
    /// # Logic
    /// 1. 生成新的记录标识。
    /// 2. 写入 `bitcoin_prices`。
    ///
    /// # Arguments
    /// * `quote`: 已归一化的报价。
    ///
    /// # Returns
    /// 返回带标识的快照。
    async fn insert_snapshot(&self, quote: &PriceQuote) -> Result<PriceSnapshot, StoreError>;

    /// 按时间升序读取全部快照。
    async fn list_snapshots(&self) -> Result<Vec<PriceSnapshot>, StoreError>;

    /// # Summary
    /// 批量写入历史收盘价。
    ///
    /// # Logic
    /// 在单个事务内逐条执行 Upsert，同一日期只保留最后写入的价格。
    ///
    /// # Returns
    /// 返回写入的条数。
    async fn upsert_historic(&self, points: &[HistoricPricePoint]) -> Result<usize, StoreError>;

    /// 按日期升序读取全部历史数据。
    async fn load_historic(&self) -> Result<Vec<HistoricPricePoint>, StoreError>;

    /// # Summary
    /// 读取半开区间 `[start, end)` 内的历史数据。
    ///
    /// # Arguments
    /// * `start`: 起始日期 (含)。
    /// * `end`: 结束日期 (不含)。
    ///
    /// # Returns
    /// 按日期升序排列的数据点。
    async fn load_historic_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HistoricPricePoint>, StoreError>;
}

//! # 测试替身
//!
//! 供 `service` / `api` 的测试使用的内存存储与脚本化数据源，不进入生产构建。

use crate::market::entity::{HistoricPricePoint, PriceQuote, PriceSnapshot};
use crate::market::error::FeedError;
use crate::market::port::PriceFeed;
use crate::store::error::StoreError;
use crate::store::port::PriceStore;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// # Summary
/// 基于内存的 `PriceStore` 实现。
///
/// # Invariants
/// - 历史数据以日期为键保存，天然去重。
#[derive(Default)]
pub struct MemPriceStore {
    snapshots: RwLock<Vec<PriceSnapshot>>,
    historic: RwLock<BTreeMap<NaiveDate, f64>>,
}

impl MemPriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接预置历史数据，绕过数据源。
    pub async fn seed_historic(&self, points: &[(NaiveDate, f64)]) {
        let mut historic = self.historic.write().await;
        for (date, price) in points {
            historic.insert(*date, *price);
        }
    }
}

#[async_trait]
impl PriceStore for MemPriceStore {
    async fn insert_snapshot(&self, quote: &PriceQuote) -> Result<PriceSnapshot, StoreError> {
        let snapshot = PriceSnapshot::from_quote(uuid::Uuid::new_v4().to_string(), quote);
        self.snapshots.write().await.push(snapshot.clone());
        Ok(snapshot)
    }

    async fn list_snapshots(&self) -> Result<Vec<PriceSnapshot>, StoreError> {
        let mut all = self.snapshots.read().await.clone();
        all.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn upsert_historic(&self, points: &[HistoricPricePoint]) -> Result<usize, StoreError> {
        let mut historic = self.historic.write().await;
        for p in points {
            historic.insert(p.time, p.price);
        }
        Ok(points.len())
    }

    async fn load_historic(&self) -> Result<Vec<HistoricPricePoint>, StoreError> {
        Ok(self
            .historic
            .read()
            .await
            .iter()
            .map(|(time, price)| HistoricPricePoint { time: *time, price: *price })
            .collect())
    }

    async fn load_historic_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HistoricPricePoint>, StoreError> {
        Ok(self
            .historic
            .read()
            .await
            .range(start..end)
            .map(|(time, price)| HistoricPricePoint { time: *time, price: *price })
            .collect())
    }
}

/// # Summary
/// 脚本化的数据源：返回预设的报价与历史序列，或按需模拟失败。
pub struct StaticPriceFeed {
    quote: Option<PriceQuote>,
    historic: Vec<HistoricPricePoint>,
}

impl StaticPriceFeed {
    /// 总是返回指定报价与历史序列的数据源。
    pub fn new(quote: PriceQuote, historic: Vec<HistoricPricePoint>) -> Self {
        Self {
            quote: Some(quote),
            historic,
        }
    }

    /// 所有请求均以网络错误失败的数据源。
    pub fn failing() -> Self {
        Self {
            quote: None,
            historic: Vec::new(),
        }
    }
}

#[async_trait]
impl PriceFeed for StaticPriceFeed {
    async fn current_price(&self) -> Result<PriceQuote, FeedError> {
        self.quote
            .ok_or_else(|| FeedError::Network("static feed configured to fail".to_string()))
    }

    async fn historical_close(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HistoricPricePoint>, FeedError> {
        if self.quote.is_none() {
            return Err(FeedError::Network("static feed configured to fail".to_string()));
        }
        Ok(self
            .historic
            .iter()
            .filter(|p| p.time >= start && p.time <= end)
            .copied()
            .collect())
    }
}

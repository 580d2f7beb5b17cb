use btcdash_core::config::AppConfig;
use btcdash_core::market::entity::{HistoricPricePoint, PriceSnapshot};
use btcdash_core::market::port::PriceFeed;
use btcdash_core::store::port::PriceStore;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::historic::HistoricQuery;
use crate::kpi::{KpiSummary, compute_kpis};

/// # Summary
/// 服务层运行参数，由 `AppConfig` 派生。
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    // 历史收盘价抓取区间 (含两端)
    pub historic_start: NaiveDate,
    pub historic_end: NaiveDate,
    // KPI 默认关注年份
    pub focus_year: i32,
}

impl From<&AppConfig> for ServiceSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            historic_start: config.feed.historic_start,
            historic_end: config.feed.historic_end,
            focus_year: config.kpi.focus_year,
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// # Summary
/// 价格服务，系统的应用服务层门面 (Facade)。
/// 编译期仅依赖 `btcdash-core` 中的 Trait 定义，所有具体实现通过构造函数注入。
///
/// # Invariants
/// - `feed` 和 `store` 必须在构造时由外部提供，生命周期与进程等同。
/// - 不持有任何可变内存状态，请求处理与定时任务只通过存储交互。
pub struct PriceService {
    // 价格数据源
    feed: Arc<dyn PriceFeed>,
    // 价格持久化接口
    store: Arc<dyn PriceStore>,
    settings: ServiceSettings,
}

impl PriceService {
    /// # Summary
    /// 创建 PriceService 实例。
    ///
    /// # Arguments
    /// * `feed` - 数据源的具体实现。
    /// * `store` - 存储的具体实现。
    /// * `settings` - 运行参数。
    ///
    /// # Returns
    /// * `Arc<Self>` - 可共享的服务实例。
    pub fn new(
        feed: Arc<dyn PriceFeed>,
        store: Arc<dyn PriceStore>,
        settings: ServiceSettings,
    ) -> Arc<Self> {
        Arc::new(Self {
            feed,
            store,
            settings,
        })
    }

    /// # Summary
    /// 抓取当前报价并落库。
    ///
    /// # Logic
    /// 1. 调用数据源获取报价，失败直接返回，不重试。
    /// 2. 追加写入一条快照。
    ///
    /// # Returns
    /// * `Result<PriceSnapshot, ServiceError>` - 已落库的快照。
    pub async fn fetch_and_store(&self) -> Result<PriceSnapshot, ServiceError> {
        let quote = self.feed.current_price().await?;
        let snapshot = self.store.insert_snapshot(&quote).await?;
        info!(
            "Stored bitcoin price snapshot {} (USD {})",
            snapshot.id, snapshot.usd
        );
        Ok(snapshot)
    }

    /// 抓取并落库后只返回美元价格。
    pub async fn current_usd_price(&self) -> Result<f64, ServiceError> {
        Ok(self.fetch_and_store().await?.usd)
    }

    /// 按时间升序列出全部快照。
    pub async fn snapshots(&self) -> Result<Vec<PriceSnapshot>, ServiceError> {
        Ok(self.store.list_snapshots().await?)
    }

    /// # Summary
    /// 加载配置区间内的历史收盘价并返回全量历史集合。
    ///
    /// # Logic
    /// 1. 从数据源抓取 `[historic_start, historic_end]` 的每日收盘价。
    /// 2. 以日期为键批量 Upsert，重复加载不会产生重复行。
    /// 3. 读回全部历史数据 (按日期升序)。
    ///
    /// # Returns
    /// * `Result<Vec<HistoricPricePoint>, ServiceError>`
    pub async fn load_historic(&self) -> Result<Vec<HistoricPricePoint>, ServiceError> {
        let points = self
            .feed
            .historical_close(self.settings.historic_start, self.settings.historic_end)
            .await?;
        let written = self.store.upsert_historic(&points).await?;
        info!(
            "Upserted {} historic close points ({} .. {})",
            written, self.settings.historic_start, self.settings.historic_end
        );
        Ok(self.store.load_historic().await?)
    }

    /// # Summary
    /// 基于全量历史数据计算 KPI。
    ///
    /// # Arguments
    /// * `focus_year` - 单独统计极值的年份，`None` 时使用配置的默认年份。
    ///
    /// # Returns
    /// 历史集合为空时返回 `ServiceError::EmptyDataset`。
    pub async fn kpis(&self, focus_year: Option<i32>) -> Result<KpiSummary, ServiceError> {
        let points = self.store.load_historic().await?;
        let year = focus_year.unwrap_or(self.settings.focus_year);
        let summary = compute_kpis(&points, year).inspect_err(|e| {
            if matches!(e, ServiceError::EmptyDataset) {
                warn!("KPI requested before any historic data was loaded");
            }
        })?;
        debug!("Computed KPIs over {} points (focus year {})", summary.count, year);
        Ok(summary)
    }

    /// # Summary
    /// 查询指定自然月内的历史数据。
    ///
    /// # Logic
    /// 1. 校验年月。
    /// 2. 以日期区间 `[月初, 次月月初)` 查询存储。
    ///
    /// # Returns
    /// 按日期升序的数据点，无匹配时为空列表。
    pub async fn historic_month(
        &self,
        query: HistoricQuery,
    ) -> Result<Vec<HistoricPricePoint>, ServiceError> {
        let ym = query.year_month()?;
        debug!("Loading historic slice for {}", ym);
        Ok(self
            .store
            .load_historic_between(ym.first_day(), ym.next_first_day())
            .await?)
    }
}

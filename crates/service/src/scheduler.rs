use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::error::ServiceError;
use crate::price::PriceService;

/// # Summary
/// 定时抓取任务：按固定周期调用 `PriceService::fetch_and_store`。
///
/// # Invariants
/// - 计时以进程启动为锚点，不补跑错过的周期，也不持久化调度状态。
/// - 单次失败只记录日志，不影响后续周期。
/// - 句柄被丢弃时后台协程随之中止。
pub struct PriceScheduler {
    handle: JoinHandle<()>,
}

impl PriceScheduler {
    /// # Summary
    /// 启动后台定时任务。
    ///
    /// # Logic
    /// 1. `run_on_start` 为 true 时首个周期立即触发，否则在一个周期后触发。
    /// 2. 错过的 tick 顺延 (`MissedTickBehavior::Delay`)。
    /// 3. 每个周期执行一次抓取与落库。
    ///
    /// # Arguments
    /// * `service` - 共享的价格服务。
    /// * `period` - 调度周期。
    /// * `run_on_start` - 是否在启动时立即执行一次。
    ///
    /// # Returns
    /// * `Result<Self, ServiceError>` - 持有后台协程句柄的调度器；周期为零或超出计时范围时返回
    ///   `ServiceError::InvalidSchedule`。
    pub fn start(
        service: Arc<PriceService>,
        period: Duration,
        run_on_start: bool,
    ) -> Result<Self, ServiceError> {
        if period.is_zero() {
            return Err(ServiceError::InvalidSchedule(
                "period must be greater than zero".to_string(),
            ));
        }

        let now = Instant::now();
        let next = now.checked_add(period).ok_or_else(|| {
            ServiceError::InvalidSchedule(format!("period {:?} is out of range", period))
        })?;
        let first_tick = if run_on_start { now } else { next };

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match service.fetch_and_store().await {
                    Ok(snapshot) => info!("Scheduled price fetch succeeded: USD {}", snapshot.usd),
                    Err(e) => error!("Scheduled price fetch failed: {}", e),
                }
            }
        });

        info!("Price scheduler started (period: {:?}, run_on_start: {})", period, run_on_start);
        Ok(Self { handle })
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// 停止后台任务。
    pub fn shutdown(self) {
        self.handle.abort();
        info!("Price scheduler stopped");
    }
}

impl Drop for PriceScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

use btcdash_core::market::error::FeedError;
use btcdash_core::store::error::StoreError;
use thiserror::Error;

/// # Summary
/// 服务层的统一错误类型，每个操作以 `Result<T, ServiceError>` 返回。
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    /// 历史数据集为空，无法计算统计量
    #[error("No historic price data available")]
    EmptyDataset,
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),
}

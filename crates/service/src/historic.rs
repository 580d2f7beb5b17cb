use btcdash_core::common::YearMonth;

use crate::error::ServiceError;

/// # Summary
/// 按自然月切片历史数据的查询条件。
///
/// # Invariants
/// - 字段保留调用方原始输入，合法性由 `year_month` 统一校验。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoricQuery {
    pub year: i32,
    pub month: i32,
}

impl HistoricQuery {
    pub fn new(year: i32, month: i32) -> Self {
        Self { year, month }
    }

    /// # Summary
    /// 将查询条件转换为经过校验的 `YearMonth`。
    ///
    /// # Logic
    /// 1. 月份必须位于 1..=12。
    /// 2. 年份必须能被日历表示。
    ///
    /// # Returns
    /// 非法输入返回 `ServiceError::InvalidQuery`。
    pub fn year_month(&self) -> Result<YearMonth, ServiceError> {
        let month = u32::try_from(self.month)
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| {
                ServiceError::InvalidQuery(format!("month must be within 1-12, got {}", self.month))
            })?;

        YearMonth::new(self.year, month).ok_or_else(|| {
            ServiceError::InvalidQuery(format!("year {} is out of range", self.year))
        })
    }
}

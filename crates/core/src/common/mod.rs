use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// # Summary
/// 自然月标识，历史行情按月切片查询的键。
///
/// # Invariants
/// - `month` 始终位于 1..=12。
/// - 该月首日必须能被 `NaiveDate` 表示。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// # Summary
    /// 构造并校验一个自然月。
    ///
    /// # Arguments
    /// * `year`: 公历年份。
    /// * `month`: 月份 (1-12)。
    ///
    /// # Returns
    /// 合法时返回 `Some(YearMonth)`，月份越界或年份超出日历范围返回 `None`。
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// 该月第一天。
    pub fn first_day(&self) -> NaiveDate {
        // new() 已校验，此处回退值不会被触发
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// # Summary
    /// 下个月第一天，作为半开区间 `[first_day, next_first_day)` 的右端点。
    ///
    /// # Logic
    /// 1. 十二月滚动到次年一月。
    /// 2. 超出日历上限时返回 `NaiveDate::MAX`。
    pub fn next_first_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range_month() {
        assert!(YearMonth::new(2022, 0).is_none());
        assert!(YearMonth::new(2022, 13).is_none());
        assert!(YearMonth::new(2022, 12).is_some());
    }

    #[test]
    fn test_month_bounds_roll_over_december() {
        let ym = YearMonth::new(2021, 12).unwrap();
        assert_eq!(ym.first_day(), NaiveDate::from_ymd_opt(2021, 12, 1).unwrap());
        assert_eq!(ym.next_first_day(), NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
    }

    #[test]
    fn test_display_zero_pads_month() {
        let ym = YearMonth::new(2021, 6).unwrap();
        assert_eq!(ym.to_string(), "2021-06");
    }
}

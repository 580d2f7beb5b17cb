use btcdash_core::market::entity::HistoricPricePoint;
use chrono::Datelike;

use crate::error::ServiceError;

/// # Summary
/// 历史收盘价的汇总统计，每次请求重新计算，不做缓存。
///
/// # Invariants
/// - `min <= avg <= max`。
/// - `focus_min` 与 `focus_max` 同时为 `Some` 或同时为 `None`。
#[derive(Debug, Clone, PartialEq)]
pub struct KpiSummary {
    // 参与统计的数据点数量
    pub count: usize,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    // 样本标准差 (n - 1)，不足两个数据点时为 0
    pub volatility: f64,
    pub focus_year: i32,
    // 关注年份内的最低价，该年无数据时为 None
    pub focus_min: Option<f64>,
    pub focus_max: Option<f64>,
}

/// 单遍扫描的统计累加器 (Welford)。
#[derive(Debug, Default)]
struct RunningStats {
    count: usize,
    n: f64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.n += 1.0;
        let delta = value - self.mean;
        self.mean += delta / self.n;
        self.m2 += delta * (value - self.mean);
    }

    fn sample_std(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        (self.m2 / (self.n - 1.0)).sqrt()
    }
}

/// # Summary
/// 计算历史收盘价的 KPI。
///
/// # Logic
/// 1. 数据集为空时返回 `ServiceError::EmptyDataset`。
/// 2. 单遍扫描得到全量的最小值、最大值、均值与样本标准差。
/// 3. 再筛选 `focus_year` 年内的数据点求最小值与最大值。
///
/// # Arguments
/// * `points`: 全量历史数据点。
/// * `focus_year`: 单独统计极值的年份。
///
/// # Returns
/// 未经舍入的统计结果，展示层负责格式化。
pub fn compute_kpis(
    points: &[HistoricPricePoint],
    focus_year: i32,
) -> Result<KpiSummary, ServiceError> {
    if points.is_empty() {
        return Err(ServiceError::EmptyDataset);
    }

    let mut all = RunningStats::default();
    let mut focus = RunningStats::default();
    for p in points {
        all.push(p.price);
        if p.time.year() == focus_year {
            focus.push(p.price);
        }
    }

    let (focus_min, focus_max) = if focus.count > 0 {
        (Some(focus.min), Some(focus.max))
    } else {
        (None, None)
    };

    Ok(KpiSummary {
        count: all.count,
        avg: all.mean,
        min: all.min,
        max: all.max,
        volatility: all.sample_std(),
        focus_year,
        focus_min,
        focus_max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(date: &str, price: f64) -> HistoricPricePoint {
        HistoricPricePoint {
            time: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            price,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_kpis_over_mixed_years() {
        let points = vec![
            point("2022-01-01", 100.0),
            point("2022-06-01", 200.0),
            point("2021-01-01", 50.0),
        ];
        let kpi = compute_kpis(&points, 2022).unwrap();

        assert_eq!(kpi.count, 3);
        assert_eq!(kpi.min, 50.0);
        assert_eq!(kpi.max, 200.0);
        assert!(approx(kpi.avg, 350.0 / 3.0));
        // sqrt(((100-m)^2 + (200-m)^2 + (50-m)^2) / 2)
        assert!(approx(kpi.volatility, (17500.0_f64 / 3.0).sqrt()));
        assert_eq!(kpi.focus_min, Some(100.0));
        assert_eq!(kpi.focus_max, Some(200.0));
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        assert!(matches!(compute_kpis(&[], 2022), Err(ServiceError::EmptyDataset)));
    }

    #[test]
    fn test_single_point_has_zero_volatility() {
        let kpi = compute_kpis(&[point("2020-03-01", 42.0)], 2022).unwrap();
        assert_eq!(kpi.volatility, 0.0);
        assert_eq!(kpi.avg, 42.0);
        assert_eq!(kpi.focus_min, None);
        assert_eq!(kpi.focus_max, None);
    }

    #[test]
    fn test_focus_year_is_respected() {
        let points = vec![point("2021-05-01", 10.0), point("2021-06-01", 30.0), point("2022-01-01", 99.0)];
        let kpi = compute_kpis(&points, 2021).unwrap();
        assert_eq!(kpi.focus_year, 2021);
        assert_eq!(kpi.focus_min, Some(10.0));
        assert_eq!(kpi.focus_max, Some(30.0));
    }
}

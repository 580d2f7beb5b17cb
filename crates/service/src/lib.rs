//! # `btcdash-service` - 应用服务层
//!
//! `PriceService` 门面串联数据源与存储，并承载 KPI 统计、月度切片查询和定时抓取。
//! 编译期仅依赖 `btcdash-core` 中的 Trait，具体实现由 `app` 注入。

pub mod error;
pub mod historic;
pub mod kpi;
pub mod price;
pub mod scheduler;

//! # `btcdash-api` - HTTP API 层
//!
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 接收来自前端看板或浏览器的 HTTP 请求
//! - 调用下层 `PriceService` 完成抓取、查询与统计
//! - 将领域模型转换为 DTO 返回给前端，并把服务层错误映射为 HTTP 状态码

pub mod types;
pub mod error;
pub mod routes;
pub mod server;

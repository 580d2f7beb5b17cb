//! # `btcdash-store` - 持久化层
//!
//! `PriceStore` 端口的 SQLite 实现。

pub mod price;

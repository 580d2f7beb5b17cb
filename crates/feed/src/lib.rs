//! # `btcdash-feed` - 价格数据源
//!
//! `PriceFeed` 端口的 CoinDesk BPI 实现。

pub mod coindesk;

//! # `btcdash-core` - 领域核心
//!
//! 定义价格领域的实体、端口 (Trait) 与错误类型，以及全局配置结构。
//! 本 crate 不依赖任何具体实现，`feed` / `store` / `service` 均面向这里的抽象编程。

pub mod common;
pub mod config;
pub mod market;
pub mod store;

#[cfg(feature = "test-utils")]
pub mod test_utils;

use thiserror::Error;

/// # Summary
/// 行情抓取错误枚举，区分网络故障与上游数据格式问题。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug)]
pub enum FeedError {
    // 网络层错误：请求失败、超时或非 2xx 状态码
    #[error("Network error: {0}")]
    Network(String),
    // 上游响应缺少必需字段或数值非法
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

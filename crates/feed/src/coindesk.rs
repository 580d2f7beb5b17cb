use async_trait::async_trait;
use btcdash_core::market::entity::{HistoricPricePoint, PriceQuote};
use btcdash_core::market::error::FeedError;
use btcdash_core::market::port::PriceFeed;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

const USER_AGENT: &str = concat!("btcdash/", env!("CARGO_PKG_VERSION"));

/// # Summary
/// CoinDesk 比特币价格指数 (BPI) 提供者。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯，所有请求受统一超时约束。
/// - `base_url` 不以 `/` 结尾。
#[derive(Clone)]
pub struct CoinDeskProvider {
    /// 内部使用的 HTTP 客户端
    client: Client,
    /// 接口根路径，例如 `https://api.coindesk.com/v1/bpi`
    base_url: String,
}

impl CoinDeskProvider {
    /// # Summary
    /// 创建一个新的 CoinDeskProvider 实例。
    ///
    /// # Logic
    /// 1. 确保进程内已安装 rustls 加密后端。
    /// 2. 配置请求超时与 User-Agent。
    /// 3. 规范化 `base_url`，去掉末尾的 `/`。
    ///
    /// # Arguments
    /// * `base_url`: 接口根路径。
    /// * `timeout`: 单次请求的超时时间。
    ///
    /// # Returns
    /// 成功返回实例，HTTP 客户端构建失败返回 `FeedError::Network`。
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FeedError> {
        install_crypto_provider();

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FeedError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 发起 GET 请求并读取完整响应体，非 2xx 视为网络错误。
    async fn get_bytes(&self, url: &str, query: &[(&str, String)]) -> Result<Vec<u8>, FeedError> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FeedError::Network(format!("HTTP {}", resp.status())));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;
        Ok(body.to_vec())
    }
}

/// reqwest 以 `rustls-no-provider` 构建，需要进程级的加密后端。
fn install_crypto_provider() {
    if rustls::crypto::CryptoProvider::get_default().is_none()
        && rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
    {
        // 并发安装时另一方已经成功，无需处理
        tracing::debug!("rustls crypto provider already installed");
    }
}

/// # Summary
/// `currentprice.json` 响应顶层结构。
#[derive(Deserialize, Debug)]
struct CurrentPriceResponse {
    time: CurrentPriceTime,
    bpi: CurrentPriceBpi,
}

#[derive(Deserialize, Debug)]
struct CurrentPriceTime {
    #[serde(rename = "updatedISO")]
    updated_iso: String,
}

/// 三个币种的报价，缺任意一个都视为格式错误。
#[derive(Deserialize, Debug)]
struct CurrentPriceBpi {
    #[serde(rename = "USD")]
    usd: CurrencyRate,
    #[serde(rename = "GBP")]
    gbp: CurrencyRate,
    #[serde(rename = "EUR")]
    eur: CurrencyRate,
}

#[derive(Deserialize, Debug)]
struct CurrencyRate {
    rate_float: f64,
}

/// `historical/close.json` 响应：`bpi` 为日期到收盘价的映射。
#[derive(Deserialize, Debug)]
struct HistoricalCloseResponse {
    bpi: BTreeMap<String, f64>,
}

/// # Summary
/// 将 `currentprice.json` 响应体归一化为 `PriceQuote`。
///
/// # Logic
/// 1. 反序列化嵌套的 `bpi.{USD,GBP,EUR}.rate_float` 与 `time.updatedISO`。
/// 2. 按 RFC 3339 解析更新时间并转换为 UTC。
/// 3. 拒绝负数或非有限的报价。
///
/// # Returns
/// 成功返回报价，任何结构或数值问题返回 `FeedError::MalformedResponse`。
pub fn parse_current_price(body: &[u8]) -> Result<PriceQuote, FeedError> {
    let resp: CurrentPriceResponse =
        serde_json::from_slice(body).map_err(|e| FeedError::MalformedResponse(e.to_string()))?;

    let time = DateTime::parse_from_rfc3339(&resp.time.updated_iso)
        .map_err(|e| {
            FeedError::MalformedResponse(format!(
                "invalid updatedISO '{}': {}",
                resp.time.updated_iso, e
            ))
        })?
        .with_timezone(&Utc);

    let quote = PriceQuote {
        time,
        usd: resp.bpi.usd.rate_float,
        gbp: resp.bpi.gbp.rate_float,
        eur: resp.bpi.eur.rate_float,
    };

    if !quote.is_valid() {
        return Err(FeedError::MalformedResponse(format!(
            "rates must be non-negative: {:?}",
            quote
        )));
    }

    Ok(quote)
}

/// # Summary
/// 将 `historical/close.json` 响应体解析为按日期升序的数据点。
///
/// # Logic
/// 1. 读取 `bpi` 映射 (BTreeMap 的键序即日期序)。
/// 2. 每个键必须是 `YYYY-MM-DD`，价格必须非负有限。
pub fn parse_historical_close(body: &[u8]) -> Result<Vec<HistoricPricePoint>, FeedError> {
    let resp: HistoricalCloseResponse =
        serde_json::from_slice(body).map_err(|e| FeedError::MalformedResponse(e.to_string()))?;

    resp.bpi
        .into_iter()
        .map(|(date, price)| {
            let time = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
                FeedError::MalformedResponse(format!("invalid date key '{}': {}", date, e))
            })?;
            if !price.is_finite() || price < 0.0 {
                return Err(FeedError::MalformedResponse(format!(
                    "invalid close price {} on {}",
                    price, date
                )));
            }
            Ok(HistoricPricePoint { time, price })
        })
        .collect()
}

#[async_trait]
impl PriceFeed for CoinDeskProvider {
    /// # Summary
    /// 抓取当前 BPI 报价。
    ///
    /// # Logic
    /// 1. 请求 `{base_url}/currentprice.json`。
    /// 2. 交由 `parse_current_price` 归一化。
    async fn current_price(&self) -> Result<PriceQuote, FeedError> {
        let url = format!("{}/currentprice.json", self.base_url);
        let body = self.get_bytes(&url, &[]).await?;
        parse_current_price(&body)
    }

    /// # Summary
    /// 抓取区间内的每日收盘价。
    ///
    /// # Logic
    /// 1. 请求 `{base_url}/historical/close.json?start=..&end=..`。
    /// 2. 交由 `parse_historical_close` 解析。
    async fn historical_close(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HistoricPricePoint>, FeedError> {
        let url = format!("{}/historical/close.json", self.base_url);
        let body = self
            .get_bytes(
                &url,
                &[
                    ("start", start.format("%Y-%m-%d").to_string()),
                    ("end", end.format("%Y-%m-%d").to_string()),
                ],
            )
            .await?;
        let points = parse_historical_close(&body)?;
        tracing::debug!("Fetched {} historic close points ({} .. {})", points.len(), start, end);
        Ok(points)
    }
}

use axum::Router;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use btcdash_core::market::error::FeedError;
use btcdash_core::market::port::PriceFeed;
use btcdash_feed::coindesk::CoinDeskProvider;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::time::Duration;
use tokio::net::TcpListener;

const CURRENT_PRICE: &str = r#"{
    "time": {"updatedISO": "2023-05-06T12:00:00+00:00"},
    "bpi": {
        "USD": {"rate_float": 29000.25},
        "GBP": {"rate_float": 23000.5},
        "EUR": {"rate_float": 26000.75}
    }
}"#;

/// # Summary
/// 在随机端口启动一个模拟 CoinDesk 的上游服务，返回其根路径。
///
/// # Logic
/// 1. `/ok/...` 返回合法数据，历史接口回显请求的 start/end 作为两条数据点。
/// 2. `/broken/...` 返回缺少 `bpi.USD` 的报价。
/// 3. `/down/...` 一律返回 503。
async fn spawn_fake_upstream() -> String {
    async fn historical(Query(q): Query<HashMap<String, String>>) -> impl IntoResponse {
        let start = q.get("start").cloned().unwrap_or_default();
        let end = q.get("end").cloned().unwrap_or_default();
        format!(r#"{{"bpi": {{"{}": 100.5, "{}": 200.25}}}}"#, end, start)
    }

    let app = Router::new()
        .route("/ok/currentprice.json", get(|| async { CURRENT_PRICE }))
        .route("/ok/historical/close.json", get(historical))
        .route(
            "/broken/currentprice.json",
            get(|| async {
                r#"{"time": {"updatedISO": "2023-05-06T12:00:00+00:00"}, "bpi": {"GBP": {"rate_float": 1.0}, "EUR": {"rate_float": 1.0}}}"#
            }),
        )
        .route(
            "/down/currentprice.json",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_fetch_current_price_from_upstream() -> anyhow::Result<()> {
    let base = spawn_fake_upstream().await;
    let provider = CoinDeskProvider::new(&format!("{}/ok", base), Duration::from_secs(5))?;

    let quote = provider.current_price().await?;
    assert_eq!(quote.usd, 29000.25);
    assert_eq!(quote.gbp, 23000.5);
    assert_eq!(quote.eur, 26000.75);
    Ok(())
}

#[tokio::test]
async fn test_fetch_historical_close_sends_range() -> anyhow::Result<()> {
    let base = spawn_fake_upstream().await;
    let provider = CoinDeskProvider::new(&format!("{}/ok/", base), Duration::from_secs(5))?;

    let start = NaiveDate::from_ymd_opt(2013, 9, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2023, 5, 6).unwrap();
    let points = provider.historical_close(start, end).await?;

    assert_eq!(points.len(), 2);
    assert_eq!(points[0].time, start);
    assert_eq!(points[0].price, 200.25);
    assert_eq!(points[1].time, end);
    assert_eq!(points[1].price, 100.5);
    Ok(())
}

#[tokio::test]
async fn test_missing_usd_surfaces_as_malformed() {
    let base = spawn_fake_upstream().await;
    let provider =
        CoinDeskProvider::new(&format!("{}/broken", base), Duration::from_secs(5)).unwrap();

    let result = provider.current_price().await;
    assert!(matches!(result, Err(FeedError::MalformedResponse(_))), "{:?}", result);
}

#[tokio::test]
async fn test_non_success_status_is_network_error() {
    let base = spawn_fake_upstream().await;
    let provider =
        CoinDeskProvider::new(&format!("{}/down", base), Duration::from_secs(5)).unwrap();

    match provider.current_price().await {
        Err(FeedError::Network(msg)) => assert!(msg.contains("503"), "{}", msg),
        other => panic!("expected network error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_upstream_is_network_error() {
    // 端口 9 (discard) 在测试环境中不会有 HTTP 服务
    let provider = CoinDeskProvider::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    assert!(matches!(
        provider.current_price().await,
        Err(FeedError::Network(_))
    ));
}

use btcdash_core::market::entity::{HistoricPricePoint, PriceQuote};
use btcdash_core::store::port::PriceStore;
use btcdash_core::test_utils::{MemPriceStore, StaticPriceFeed};
use btcdash_service::error::ServiceError;
use btcdash_service::historic::HistoricQuery;
use btcdash_service::price::{PriceService, ServiceSettings};
use btcdash_service::scheduler::PriceScheduler;
use btcdash_store::price::SqlitePriceStore;
use chrono::{NaiveDate, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn quote() -> PriceQuote {
    PriceQuote {
        time: Utc.with_ymd_and_hms(2023, 5, 6, 12, 0, 0).unwrap(),
        usd: 29000.25,
        gbp: 23000.5,
        eur: 26000.75,
    }
}

fn historic_series() -> Vec<HistoricPricePoint> {
    vec![
        HistoricPricePoint { time: date(2021, 1, 1), price: 50.0 },
        HistoricPricePoint { time: date(2021, 6, 15), price: 35000.5 },
        HistoricPricePoint { time: date(2022, 1, 1), price: 100.0 },
        HistoricPricePoint { time: date(2022, 6, 1), price: 200.0 },
    ]
}

#[tokio::test]
async fn test_fetch_and_store_returns_stored_usd() {
    let store = Arc::new(MemPriceStore::new());
    let feed = Arc::new(StaticPriceFeed::new(quote(), vec![]));
    let service = PriceService::new(feed, store.clone(), ServiceSettings::default());

    let price = service.current_usd_price().await.unwrap();
    let stored = store.list_snapshots().await.unwrap();

    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].usd, price);
    assert_eq!(stored[0].gbp, 23000.5);
}

#[tokio::test]
async fn test_feed_failure_stores_nothing() {
    let store = Arc::new(MemPriceStore::new());
    let service = PriceService::new(
        Arc::new(StaticPriceFeed::failing()),
        store.clone(),
        ServiceSettings::default(),
    );

    assert!(matches!(service.current_usd_price().await, Err(ServiceError::Feed(_))));
    assert!(store.list_snapshots().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_historic_load_is_idempotent_on_sqlite() -> anyhow::Result<()> {
    let tmp_dir = tempdir()?;
    let store = Arc::new(SqlitePriceStore::open(&tmp_dir.path().join("prices.db")).await?);
    let feed = Arc::new(StaticPriceFeed::new(quote(), historic_series()));
    let service = PriceService::new(feed, store, ServiceSettings::default());

    let first = service.load_historic().await?;
    let second = service.load_historic().await?;
    assert_eq!(first.len(), 4);
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn test_historic_load_respects_configured_range() {
    let store = Arc::new(MemPriceStore::new());
    let feed = Arc::new(StaticPriceFeed::new(quote(), historic_series()));
    let settings = ServiceSettings {
        historic_start: date(2022, 1, 1),
        historic_end: date(2022, 12, 31),
        focus_year: 2022,
    };
    let service = PriceService::new(feed, store, settings);

    let loaded = service.load_historic().await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert!(loaded.iter().all(|p| p.time >= date(2022, 1, 1)));
}

#[tokio::test]
async fn test_kpis_and_month_slice_from_store() {
    let store = Arc::new(MemPriceStore::new());
    store
        .seed_historic(&[
            (date(2022, 1, 1), 100.0),
            (date(2022, 6, 1), 200.0),
            (date(2021, 1, 1), 50.0),
        ])
        .await;
    let service = PriceService::new(
        Arc::new(StaticPriceFeed::failing()),
        store.clone(),
        ServiceSettings::default(),
    );

    let kpi = service.kpis(None).await.unwrap();
    assert_eq!(kpi.min, 50.0);
    assert_eq!(kpi.max, 200.0);
    assert_eq!(kpi.focus_min, Some(100.0));
    assert_eq!(kpi.focus_max, Some(200.0));

    let kpi_2021 = service.kpis(Some(2021)).await.unwrap();
    assert_eq!(kpi_2021.focus_max, Some(50.0));

    let june = service.historic_month(HistoricQuery::new(2022, 6)).await.unwrap();
    assert_eq!(june.len(), 1);
    assert_eq!(june[0].price, 200.0);

    let none = service.historic_month(HistoricQuery::new(2019, 6)).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_kpis_on_empty_store_is_empty_dataset() {
    let service = PriceService::new(
        Arc::new(StaticPriceFeed::failing()),
        Arc::new(MemPriceStore::new()),
        ServiceSettings::default(),
    );
    assert!(matches!(service.kpis(None).await, Err(ServiceError::EmptyDataset)));
}

#[tokio::test]
async fn test_invalid_month_is_rejected_before_store_access() {
    let service = PriceService::new(
        Arc::new(StaticPriceFeed::failing()),
        Arc::new(MemPriceStore::new()),
        ServiceSettings::default(),
    );
    assert!(matches!(
        service.historic_month(HistoricQuery::new(2022, 13)).await,
        Err(ServiceError::InvalidQuery(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_fires_once_per_period() {
    let store = Arc::new(MemPriceStore::new());
    let feed = Arc::new(StaticPriceFeed::new(quote(), vec![]));
    let service = PriceService::new(feed, store.clone(), ServiceSettings::default());

    let period = Duration::from_secs(60);
    let scheduler = PriceScheduler::start(service, period, false).unwrap();
    assert!(scheduler.is_running());

    // 首个周期之前不触发
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(store.list_snapshots().await.unwrap().len(), 0);

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(store.list_snapshots().await.unwrap().len(), 1);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(store.list_snapshots().await.unwrap().len(), 3);

    scheduler.shutdown();
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(store.list_snapshots().await.unwrap().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_survives_feed_failures() {
    let store = Arc::new(MemPriceStore::new());
    let service = PriceService::new(
        Arc::new(StaticPriceFeed::failing()),
        store.clone(),
        ServiceSettings::default(),
    );

    let scheduler = PriceScheduler::start(service, Duration::from_secs(10), true).unwrap();
    tokio::time::sleep(Duration::from_secs(35)).await;

    assert!(scheduler.is_running());
    assert!(store.list_snapshots().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_runs_immediately_when_requested() {
    let store = Arc::new(MemPriceStore::new());
    let feed = Arc::new(StaticPriceFeed::new(quote(), vec![]));
    let service = PriceService::new(feed, store.clone(), ServiceSettings::default());

    let period = Duration::from_secs(60);
    let scheduler = PriceScheduler::start(service, period, true).unwrap();

    // 启动后立即抓取一次，远早于首个周期
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(store.list_snapshots().await.unwrap().len(), 1);

    tokio::time::sleep(period).await;
    assert_eq!(store.list_snapshots().await.unwrap().len(), 2);

    scheduler.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_rejects_unrepresentable_period() {
    let store = Arc::new(MemPriceStore::new());
    let feed = Arc::new(StaticPriceFeed::new(quote(), vec![]));
    let service = PriceService::new(feed, store, ServiceSettings::default());

    for run_on_start in [false, true] {
        let result =
            PriceScheduler::start(service.clone(), Duration::from_secs(u64::MAX), run_on_start);
        assert!(matches!(result, Err(ServiceError::InvalidSchedule(_))));
    }

    let result = PriceScheduler::start(service, Duration::ZERO, false);
    assert!(matches!(result, Err(ServiceError::InvalidSchedule(_))));
}

mod logging;
mod settings;

use std::sync::Arc;
use std::time::Duration;

use btcdash_api::server::{AppState, start_server};
use btcdash_feed::coindesk::CoinDeskProvider;
use btcdash_service::price::{PriceService, ServiceSettings};
use btcdash_service::scheduler::PriceScheduler;
use btcdash_store::price::SqlitePriceStore;
use tracing::{info, warn};

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并通过 Arc<dyn Trait> 注入到 PriceService。
///
/// # Logic
/// 1. 加载分层配置并初始化全局日志。
/// 2. 实例化基础设施层（Store、Feed）。
/// 3. 构造应用服务层（PriceService）并启动定时抓取。
/// 4. 启动 HTTP 服务，收到退出信号后优雅关闭。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 配置与日志
    let config = settings::load()?;
    let _log_guard = logging::init_logging(&config.log)?;
    info!("btcdash starting...");

    // 2. 实例化基础设施层
    let store = Arc::new(
        SqlitePriceStore::connect(
            &config.database.url,
            Duration::from_secs(config.database.acquire_timeout_secs),
        )
        .await?,
    );
    info!("Price store ready at {}", config.database.url);

    let feed = Arc::new(CoinDeskProvider::new(
        &config.feed.base_url,
        Duration::from_secs(config.feed.timeout_secs),
    )?);

    // 3. 应用服务层与定时任务
    let price_service = PriceService::new(feed, store, ServiceSettings::from(&config));
    let scheduler = PriceScheduler::start(
        price_service.clone(),
        Duration::from_secs(config.scheduler.interval_secs),
        config.scheduler.run_on_start,
    )?;

    // 4. HTTP 服务，阻塞直到退出信号
    let result = start_server(
        AppState { price_service },
        &config.bind_addr(),
        &config.server.cors_origins,
        shutdown_signal(),
    )
    .await;

    scheduler.shutdown();
    info!("Shutdown complete");
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received. Exiting...");
}

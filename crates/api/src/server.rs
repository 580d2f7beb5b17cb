//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI、配置 CORS 并绑定 TCP 端口对外提供服务。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 的 DI 容器持有并调用。

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use btcdash_service::price::PriceService;

use crate::routes::{historic, price};

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - `price_service` 在服务启动前由 DI 容器注入，生命周期与进程等同。
#[derive(Clone)]
pub struct AppState {
    /// 价格服务 (Facade)
    pub price_service: Arc<PriceService>,
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

/// 全局 OpenAPI 文档结构
#[derive(OpenApi)]
#[openapi(
    info(
        title = "btcdash 比特币价格 API",
        version = "0.1.0",
        description = "比特币价格抓取、历史收盘价查询与 KPI 统计接口。",
        license(name = "MIT")
    ),
    tags(
        (name = "价格 (Price)", description = "实时价格抓取与快照查询"),
        (name = "历史 (Historic)", description = "历史收盘价加载、按月查询与 KPI 统计")
    )
)]
pub struct ApiDoc;

// ============================================================
//  服务构建与启动
// ============================================================

/// 根据配置的来源列表构建 CORS 中间件，非法的来源会被跳过并记录告警。
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET])
        .allow_headers(Any)
}

/// 构建完整的 axum 应用路由树 (含 Swagger UI 与 CORS)。
///
/// # Arguments
/// * `state` - 由外部 DI 容器注入的共享状态
/// * `cors_origins` - 允许跨域访问的前端来源
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    // 1. 所有接口均为公开只读接口
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(price::get_bitcoin_price))
        .routes(routes!(price::get_bitcoin_data))
        .routes(routes!(historic::get_bitcoin_historic))
        .routes(routes!(historic::get_bitcoin_kpis))
        .routes(routes!(historic::get_historic))
        .with_state(state)
        .split_for_parts();

    // 2. 合并 Swagger UI 路由并应用中间件
    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(cors_layer(cors_origins))
}

/// 绑定端口并启动 HTTP 监听，直到 `shutdown` 完成后优雅退出。
///
/// # Arguments
/// * `state` - 由外部 DI 容器注入的共享状态
/// * `bind_addr` - 监听的地址与端口，如 `"0.0.0.0:8000"`
/// * `cors_origins` - 允许跨域访问的前端来源
/// * `shutdown` - 退出信号
///
/// # Returns
/// TCP 绑定或服务运行失败时返回错误。
pub async fn start_server(
    state: AppState,
    bind_addr: &str,
    cors_origins: &[String],
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(state, cors_origins);

    tracing::info!("🚀 btcdash API Server listening on {}", bind_addr);
    tracing::info!("📖 Swagger UI: http://{}/swagger-ui/", bind_addr);

    let listener = TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

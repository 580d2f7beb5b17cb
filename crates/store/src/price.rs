use async_trait::async_trait;
use btcdash_core::market::entity::{HistoricPricePoint, PriceQuote, PriceSnapshot};
use btcdash_core::store::error::StoreError;
use btcdash_core::store::port::PriceStore;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// 连接池默认的获取连接超时
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// PriceStore 的 SQLite 实现。
///
/// # Summary
/// 在单个 SQLite 数据库中维护 `bitcoin_prices` (实时快照) 与 `bitcoin_historic` (每日收盘价) 两张表。
///
/// # Invariants
/// * 表结构在存储实例创建时初始化。
/// * `bitcoin_historic.time` 为主键，同一日期只存在一条记录。
/// * 所有操作均通过共享的 `SqlitePool` 执行。
pub struct SqlitePriceStore {
    pool: SqlitePool,
}

impl SqlitePriceStore {
    /// 通过连接串创建存储实例。
    ///
    /// # Logic
    /// 1. 校验并解析 `sqlite://` 连接串，开启 `create_if_missing`。
    /// 2. 确保数据库文件所在目录存在。
    /// 3. 建立连接池并初始化表结构。
    ///
    /// # Arguments
    /// * `url` - SQLite 连接串，如 `sqlite://data/btcdash.db`。
    /// * `acquire_timeout` - 从连接池获取连接的超时时间。
    ///
    /// # Returns
    /// * `Result<Self, StoreError>` - 存储实例或错误。
    pub async fn connect(url: &str, acquire_timeout: Duration) -> Result<Self, StoreError> {
        if !url.starts_with("sqlite:") {
            return Err(StoreError::InitError(format!(
                "unsupported database url '{}', expected sqlite://",
                url
            )));
        }

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::InitError(format!("invalid database url '{}': {}", url, e)))?
            .create_if_missing(true);

        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::InitError(e.to_string()))?;
            }
        }

        Self::with_options(options, acquire_timeout).await
    }

    /// 直接以文件路径打开存储，文件不存在时自动创建。
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::with_options(options, DEFAULT_ACQUIRE_TIMEOUT).await
    }

    async fn with_options(
        options: SqliteConnectOptions,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::InitError(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bitcoin_prices (
                id TEXT PRIMARY KEY,
                time DATETIME NOT NULL,
                usd REAL NOT NULL,
                gbp REAL NOT NULL,
                eur REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS bitcoin_historic (
                time DATE PRIMARY KEY,
                price REAL NOT NULL
            );
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::InitError(e.to_string()))?;

        info!("SQLite price store initialized");
        Ok(Self { pool })
    }
}

#[async_trait]
impl PriceStore for SqlitePriceStore {
    /// # Summary
    /// 追加一条报价快照。
    ///
    /// # Logic
    /// 生成 UUID v4 作为标识后写入 `bitcoin_prices`。
    async fn insert_snapshot(&self, quote: &PriceQuote) -> Result<PriceSnapshot, StoreError> {
        let snapshot = PriceSnapshot::from_quote(Uuid::new_v4().to_string(), quote);

        sqlx::query("INSERT INTO bitcoin_prices (id, time, usd, gbp, eur) VALUES (?, ?, ?, ?, ?)")
            .bind(&snapshot.id)
            .bind(snapshot.time)
            .bind(snapshot.usd)
            .bind(snapshot.gbp)
            .bind(snapshot.eur)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(snapshot)
    }

    async fn list_snapshots(&self) -> Result<Vec<PriceSnapshot>, StoreError> {
        let records = sqlx::query_as::<_, (String, DateTime<Utc>, f64, f64, f64)>(
            "SELECT id, time, usd, gbp, eur FROM bitcoin_prices ORDER BY time ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(records
            .into_iter()
            .map(|r| PriceSnapshot {
                id: r.0,
                time: r.1,
                usd: r.2,
                gbp: r.3,
                eur: r.4,
            })
            .collect())
    }

    /// # Summary
    /// 批量写入历史收盘价。
    ///
    /// # Logic
    /// 1. 开启事务。
    /// 2. 逐条执行 `INSERT OR REPLACE`，以日期去重。
    /// 3. 提交事务，任一失败则整体回滚。
    async fn upsert_historic(&self, points: &[HistoricPricePoint]) -> Result<usize, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        for point in points {
            sqlx::query("INSERT OR REPLACE INTO bitcoin_historic (time, price) VALUES (?, ?)")
                .bind(point.time)
                .bind(point.price)
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        debug!("Upserted {} historic price points", points.len());

        Ok(points.len())
    }

    async fn load_historic(&self) -> Result<Vec<HistoricPricePoint>, StoreError> {
        let records = sqlx::query_as::<_, (NaiveDate, f64)>(
            "SELECT time, price FROM bitcoin_historic ORDER BY time ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(records
            .into_iter()
            .map(|(time, price)| HistoricPricePoint { time, price })
            .collect())
    }

    /// # Summary
    /// 读取半开区间内的历史数据。
    ///
    /// # Logic
    /// 以日期类型绑定参数，按 `time >= start AND time < end` 过滤。
    async fn load_historic_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HistoricPricePoint>, StoreError> {
        let records = sqlx::query_as::<_, (NaiveDate, f64)>(
            r#"
            SELECT time, price
            FROM bitcoin_historic
            WHERE time >= ? AND time < ?
            ORDER BY time ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(records
            .into_iter()
            .map(|(time, price)| HistoricPricePoint { time, price })
            .collect())
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 调度周期上限：10 年
pub const MAX_INTERVAL_SECS: u64 = 10 * 366 * 24 * 60 * 60;

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub feed: FeedConfig,
    pub scheduler: SchedulerConfig,
    pub kpi: KpiConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 允许跨域访问的前端来源
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite 连接串，例如 `sqlite://data/btcdash.db`
    pub url: String,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// 价格指数接口根路径
    pub base_url: String,
    pub timeout_secs: u64,
    /// 历史收盘价抓取区间 (含两端)
    pub historic_start: NaiveDate,
    pub historic_end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub interval_secs: u64,
    /// 为 true 时进程启动后立即执行一次抓取
    pub run_on_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiConfig {
    /// `min_two` / `max_two` 统计所针对的年份
    pub focus_year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `RUST_LOG` 未设置时使用的过滤指令
    pub level: String,
    /// 滚动日志目录，为空则只输出到标准输出
    pub dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                cors_origins: vec![
                    "http://localhost".to_string(),
                    "http://localhost:3000".to_string(),
                ],
            },
            database: DatabaseConfig {
                url: "sqlite://data/btcdash.db".to_string(),
                acquire_timeout_secs: 5,
            },
            feed: FeedConfig {
                base_url: "https://api.coindesk.com/v1/bpi".to_string(),
                timeout_secs: 10,
                historic_start: NaiveDate::from_ymd_opt(2013, 9, 1).unwrap_or_default(),
                historic_end: NaiveDate::from_ymd_opt(2023, 5, 6).unwrap_or_default(),
            },
            scheduler: SchedulerConfig {
                interval_secs: 24 * 60 * 60,
                run_on_start: false,
            },
            kpi: KpiConfig { focus_year: 2022 },
            log: LogConfig {
                level: "info".to_string(),
                dir: None,
            },
        }
    }
}

impl AppConfig {
    /// # Summary
    /// 校验配置项之间的约束。
    ///
    /// # Returns
    /// 配置合法返回 Ok，否则返回描述问题的字符串。
    pub fn validate(&self) -> Result<(), String> {
        if self.feed.historic_start > self.feed.historic_end {
            return Err(format!(
                "feed.historic_start ({}) is after feed.historic_end ({})",
                self.feed.historic_start, self.feed.historic_end
            ));
        }
        if self.scheduler.interval_secs == 0 {
            return Err("scheduler.interval_secs must be greater than zero".to_string());
        }
        if self.scheduler.interval_secs > MAX_INTERVAL_SECS {
            return Err(format!(
                "scheduler.interval_secs ({}) exceeds the maximum of {}",
                self.scheduler.interval_secs, MAX_INTERVAL_SECS
            ));
        }
        if self.feed.timeout_secs == 0 {
            return Err("feed.timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }

    /// HTTP 监听地址，如 `0.0.0.0:8000`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

//! 分层配置加载：内置默认值 → 可选配置文件 → `BTCDASH__` 前缀环境变量。

use btcdash_core::config::AppConfig;
use config::{Config, ConfigError, Environment, File};
use std::collections::HashMap;

/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "BTCDASH_CONFIG";
/// 未指定路径时尝试读取的文件名 (不含扩展名)
const DEFAULT_CONFIG_NAME: &str = "btcdash";

/// # Summary
/// 从进程环境加载配置。
///
/// # Logic
/// 读取 `BTCDASH_CONFIG` 决定配置文件路径，再交由 [`load_from`] 合并各层。
pub fn load() -> Result<AppConfig, ConfigError> {
    let path = std::env::var(CONFIG_PATH_ENV).ok();
    load_from(path.as_deref(), None)
}

/// # Summary
/// 合并默认值、配置文件与环境变量，并校验结果。
///
/// # Arguments
/// * `path` - 配置文件路径，`None` 时尝试当前目录下的 `btcdash.{toml,yaml,json}`。
/// * `env` - 替代进程环境的变量表，`None` 时读取真实环境。
///
/// # Returns
/// * `Result<AppConfig, ConfigError>` - 合并后的配置；显式指定的文件不存在或校验失败时返回错误。
pub fn load_from(
    path: Option<&str>,
    env: Option<HashMap<String, String>>,
) -> Result<AppConfig, ConfigError> {
    let file = match path {
        Some(path) => File::with_name(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
    };

    let config: AppConfig = Config::builder()
        .add_source(Config::try_from(&AppConfig::default())?)
        .add_source(file)
        .add_source(
            Environment::with_prefix("BTCDASH")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("server.cors_origins")
                .source(env),
        )
        .build()?
        .try_deserialize()?;

    config.validate().map_err(ConfigError::Message)?;
    Ok(config)
}

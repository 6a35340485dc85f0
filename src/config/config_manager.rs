// ==========================================
// 投资人批量导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: 内存 key-value，按层合并
// 优先级: 内置默认值 < JSON 配置文件 < 环境变量 ONBOARDING_<KEY> < 显式覆写
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::import_config_trait::ImportConfigReader;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "ONBOARDING_";

/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "ONBOARDING_CONFIG_PATH";

/// 默认配置目录名（位于系统配置目录下）
const CONFIG_DIR_NAME: &str = "investor-onboarding";
const CONFIG_FILE_NAME: &str = "config.json";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone)]
pub struct ConfigManager {
    values: HashMap<String, String>,
    source_path: Option<PathBuf>, // 实际加载的配置文件
}

impl ConfigManager {
    /// 仅含内置默认值的实例
    pub fn with_defaults() -> Self {
        let values = config_keys::DEFAULTS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Self {
            values,
            source_path: None,
        }
    }

    /// 按进程环境加载全部配置层
    pub fn load() -> ConfigResult<Self> {
        let path = Self::config_path();
        Self::from_sources(path.as_deref(), std::env::vars())
    }

    /// 按给定来源加载（便于测试注入）
    ///
    /// # 参数
    /// - file: 配置文件路径（不存在时忽略）
    /// - env: 环境变量键值对（仅取 ONBOARDING_ 前缀的已知键）
    pub fn from_sources<I>(file: Option<&Path>, env: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut manager = Self::with_defaults();

        if let Some(path) = file {
            manager.merge_file(path)?;
        }
        manager.merge_env(env);

        let source = manager
            .source_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(无)".to_string());
        info!(source = %source, "配置加载完成");
        Ok(manager)
    }

    /// 配置文件路径：ONBOARDING_CONFIG_PATH 优先，否则系统配置目录
    pub fn config_path() -> Option<PathBuf> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
            _ => dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)),
        }
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    fn merge_file(&mut self, path: &Path) -> ConfigResult<()> {
        if !path.exists() {
            debug!(path = %path.display(), "配置文件不存在，跳过");
            return Ok(());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let invalid = |message: String| ConfigError::InvalidFormat {
            path: path.display().to_string(),
            message,
        };

        let json: Value = serde_json::from_str(&raw).map_err(|e| invalid(e.to_string()))?;
        let Value::Object(entries) = json else {
            return Err(invalid("顶层必须是 JSON 对象".to_string()));
        };

        for (key, value) in entries {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => continue,
                other => return Err(invalid(format!("{} 的值不是标量: {}", key, other))),
            };
            self.merge_value(&key, text, "file");
        }

        self.source_path = Some(path.to_path_buf());
        Ok(())
    }

    fn merge_env<I>(&mut self, env: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in env {
            let Some(key) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let key = key.to_ascii_lowercase();
            // ONBOARDING_CONFIG_PATH 只决定文件位置，不是配置项
            if config_keys::is_known(&key) {
                self.merge_value(&key, value, "env");
            }
        }
    }

    fn merge_value(&mut self, key: &str, value: String, layer: &str) {
        if !config_keys::is_known(key) {
            warn!(config_key = key, layer, "未知配置项，已忽略");
            return;
        }
        debug!(config_key = key, layer, "配置项覆写");
        self.values.insert(key.to_string(), value);
    }

    /// 显式覆写（命令行参数等最高优先级来源）
    pub fn set_config_value(&mut self, key: &str, value: impl Into<String>) -> ConfigResult<()> {
        if !config_keys::is_known(key) {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }
        self.values.insert(key.to_string(), value.into());
        Ok(())
    }

    /// 读取配置值（空白值视为未配置）
    pub fn get_config_value(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// 读取配置值，带默认值
    fn get_config_or_default<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_config_value(key).unwrap_or(default)
    }

    /// 读取并解析配置值
    fn get_parsed<T: FromStr>(&self, key: &str, default: &str) -> ConfigResult<T> {
        let value = self.get_config_or_default(key, default);
        value.parse::<T>().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// 获取所有配置的快照（JSON格式，Token 打码）
    pub fn get_config_snapshot(&self) -> String {
        let snapshot: BTreeMap<&str, &str> = self
            .values
            .iter()
            .map(|(k, v)| {
                if k == config_keys::API_TOKEN && !v.is_empty() {
                    (k.as_str(), "***")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();

        json!(snapshot).to_string()
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    // ===== 后端连接配置 =====

    async fn get_api_base_url(&self) -> ConfigResult<String> {
        Ok(self
            .get_config_or_default(config_keys::API_BASE_URL, "http://localhost:8000")
            .to_string())
    }

    async fn get_api_token(&self) -> ConfigResult<String> {
        self.get_config_value(config_keys::API_TOKEN)
            .map(str::to_string)
            .ok_or_else(|| ConfigError::Missing(config_keys::API_TOKEN.to_string()))
    }

    async fn get_request_timeout(&self) -> ConfigResult<Duration> {
        let secs: u64 = self.get_parsed(config_keys::REQUEST_TIMEOUT_SECS, "30")?;
        Ok(Duration::from_secs(secs))
    }

    // ===== 导入上下文配置 =====

    async fn get_fund_id(&self) -> ConfigResult<Option<String>> {
        Ok(self.get_config_value(config_keys::FUND_ID).map(str::to_string))
    }

    // ===== 分波次配置 =====

    async fn get_wave_size(&self) -> ConfigResult<usize> {
        let size: usize = self.get_parsed(config_keys::WAVE_SIZE, "5")?;
        if size == 0 {
            return Err(ConfigError::InvalidValue {
                key: config_keys::WAVE_SIZE.to_string(),
                value: "0".to_string(),
            });
        }
        Ok(size)
    }

    async fn get_wave_delay(&self) -> ConfigResult<Duration> {
        let millis: u64 = self.get_parsed(config_keys::WAVE_DELAY_MS, "300")?;
        Ok(Duration::from_millis(millis))
    }

    // ===== 文件准入配置 =====

    async fn get_max_file_bytes(&self) -> ConfigResult<u64> {
        self.get_parsed(config_keys::MAX_FILE_BYTES, "5242880")
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 后端连接
    pub const API_BASE_URL: &str = "api_base_url";
    pub const API_TOKEN: &str = "api_token";
    pub const REQUEST_TIMEOUT_SECS: &str = "request_timeout_secs";

    // 导入上下文
    pub const FUND_ID: &str = "fund_id";

    // 分波次
    pub const WAVE_SIZE: &str = "wave_size";
    pub const WAVE_DELAY_MS: &str = "wave_delay_ms";

    // 文件准入
    pub const MAX_FILE_BYTES: &str = "max_file_bytes";

    /// 内置默认值（api_token / fund_id 无默认值）
    pub const DEFAULTS: &[(&str, &str)] = &[
        (API_BASE_URL, "http://localhost:8000"),
        (REQUEST_TIMEOUT_SECS, "30"),
        (WAVE_SIZE, "5"),
        (WAVE_DELAY_MS, "300"),
        (MAX_FILE_BYTES, "5242880"),
    ];

    pub const ALL: &[&str] = &[
        API_BASE_URL,
        API_TOKEN,
        REQUEST_TIMEOUT_SECS,
        FUND_ID,
        WAVE_SIZE,
        WAVE_DELAY_MS,
        MAX_FILE_BYTES,
    ];

    pub fn is_known(key: &str) -> bool {
        ALL.contains(&key)
    }
}

// ==========================================
// 投资人批量导入 - 配置层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    FileRead { path: String, message: String },

    #[error("配置文件格式错误 ({path}): {message}")]
    InvalidFormat { path: String, message: String },

    #[error("配置项缺失: {0}")]
    Missing(String),

    #[error("未知配置项: {0}")]
    UnknownKey(String),

    #[error("配置值非法: {key}={value}")]
    InvalidValue { key: String, value: String },
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;

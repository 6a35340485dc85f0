// ==========================================
// 投资人批量导入 - 配置层
// ==========================================
// 职责: 系统配置管理，支持多级覆写
// 来源: 内置默认值 / JSON 配置文件 / 环境变量 / 命令行
// ==========================================

pub mod config_manager;
pub mod error;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, CONFIG_PATH_ENV, ENV_PREFIX};
pub use error::{ConfigError, ConfigResult};
pub use import_config_trait::{ImportConfigReader, ImportSettings};

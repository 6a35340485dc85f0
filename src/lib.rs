// ==========================================
// 投资人批量导入 - 核心库
// ==========================================
// 流程: CSV 文件 → 解析 → 字段映射 → 转换/校验 → 分波次并发导入
// 技术栈: Rust + tokio + reqwest
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 数据结构与字段目录
pub mod domain;

// 数据仓储层 - 远端档案接口
pub mod repository;

// 导入层 - 解析/映射/转换/提交
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 导入向导
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{FieldKind, FieldValue, WizardStep};

// 领域实体
pub use domain::{
    FieldCatalog, FieldMapping, ImportContext, ImportResult, MappableField, ParsedDataset,
    ReviewSummary, RowError, TransformedRecord,
};

// 导入管道
pub use importer::{BatchImporter, CsvParser, FieldMapperImpl, Transformer};

// 仓储
pub use repository::{HttpInvestorProfileRepository, InvestorProfileRepository};

// API
pub use api::{ApiError, ApiResult, ImportWizard, Notification, NotificationLevel};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "投资人批量导入";

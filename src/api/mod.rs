// ==========================================
// 投资人批量导入 - API 层
// ==========================================
// 职责: 面向界面/命令行的导入向导接口
// ==========================================

pub mod error;
pub mod import_wizard;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_wizard::{
    failure_notification, notifications, ImportWizard, Notification, NotificationLevel,
};

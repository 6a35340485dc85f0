// ==========================================
// 投资人批量导入 - 导入记录与结果
// ==========================================
// 职责: 转换后记录、导入上下文、导入结果、复核汇总
// ==========================================

use crate::domain::types::FieldValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 来源标记：标识记录来自文件导入
pub const SPREADSHEET_IMPORT_SOURCE: &str = "spreadsheet_import";

// ==========================================
// TransformedRecord - 转换后记录
// ==========================================
// 缺失 key 表示"未提供值"，从不以空串占位
pub type TransformedRecord = BTreeMap<String, FieldValue>;

// ==========================================
// ImportContext - 导入上下文
// ==========================================
// 合并进每一行提交体的固定属性
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportContext {
    pub fund_id: String, // 目标基金（集合）
    pub source: String,  // 来源标记
}

impl ImportContext {
    pub fn for_fund(fund_id: impl Into<String>) -> Self {
        Self {
            fund_id: fund_id.into(),
            source: SPREADSHEET_IMPORT_SOURCE.to_string(),
        }
    }
}

// ==========================================
// RowError - 单行导入失败
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row_label: String, // 行标识（主身份字段值）
    pub message: String,   // 服务端返回的说明或通用兜底文案
}

// ==========================================
// ImportResult - 一次导入的汇总
// ==========================================
// 仅用于本次导入的结果展示，不持久化
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResult {
    pub batch_id: String,           // 本次导入批次ID（日志关联用）
    pub started_at: DateTime<Utc>,  // 开始时间
    pub elapsed_ms: u64,            // 耗时（毫秒）
    pub success_count: usize,       // 成功行数
    pub error_count: usize,         // 失败行数
    pub errors: Vec<RowError>,      // 失败明细（按提交顺序）
}

impl ImportResult {
    pub fn total(&self) -> usize {
        self.success_count + self.error_count
    }
}

// ==========================================
// ReviewSummary - 复核汇总
// ==========================================
// 仅用于展示，唯一的控制作用是 valid_rows == 0 时禁止导入
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub total_rows: usize,            // 文件数据行数
    pub valid_rows: usize,            // 可提交行数
    pub skipped_rows: usize,          // 缺必填字段被跳过的行数
    pub mapped_fields: usize,         // 已映射字段数
    pub duplicate_names: Vec<String>, // 文件内重复的主身份值（仅提示）
}

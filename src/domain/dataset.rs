// ==========================================
// 投资人批量导入 - 解析数据集
// ==========================================
// 职责: 解析器输出 + 所选文件元信息
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 一行数据：表头 → 单元格文本（缺失列为空串）
pub type RawRow = HashMap<String, String>;

// ==========================================
// ParsedTable - 解析器裸输出
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedTable {
    pub headers: Vec<String>, // 表头（按文件顺序）
    pub rows: Vec<RawRow>,    // 数据行（按文件顺序）
}

// ==========================================
// ParsedDataset - 已选文件的解析结果
// ==========================================
// 生命周期: 选择新文件时整体替换；移除文件或取消向导时销毁
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDataset {
    pub file_name: String,
    pub file_size_bytes: u64,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl ParsedDataset {
    pub fn new(file_name: impl Into<String>, file_size_bytes: u64, table: ParsedTable) -> Self {
        Self {
            file_name: file_name.into(),
            file_size_bytes,
            headers: table.headers,
            rows: table.rows,
        }
    }

    /// 至少一列表头且至少一行数据才可用
    pub fn is_usable(&self) -> bool {
        !self.headers.is_empty() && !self.rows.is_empty()
    }

    pub fn has_header(&self, header: &str) -> bool {
        self.headers.iter().any(|h| h == header)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

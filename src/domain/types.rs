// ==========================================
// 投资人批量导入 - 领域类型定义
// ==========================================
// 职责: 字段类型、字段取值、向导步骤
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 字段类型 (Field Kind)
// ==========================================
// 决定转换阶段是否做数值解析
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldKind {
    Text,    // 文本（原样保留）
    Integer, // 整数（如年龄）
    Decimal, // 小数（如金额）
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => write!(f, "TEXT"),
            FieldKind::Integer => write!(f, "INTEGER"),
            FieldKind::Decimal => write!(f, "DECIMAL"),
        }
    }
}

// ==========================================
// 字段取值 (Field Value)
// ==========================================
// 序列化为裸 JSON 标量（字符串或数字），不带标签
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl FieldValue {
    /// 取文本形式（用于行标识、重复检测）
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Integer(v) => v.to_string(),
            FieldValue::Decimal(v) => v.to_string(),
        }
    }

    /// 是否为空值（仅文本可能为空）
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

// ==========================================
// 向导步骤 (Wizard Step)
// ==========================================
// Upload → Map → Review，导入是 Review 内的动作而非第四个状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardStep {
    Upload,
    Map,
    Review,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardStep::Upload => write!(f, "UPLOAD"),
            WizardStep::Map => write!(f, "MAP"),
            WizardStep::Review => write!(f, "REVIEW"),
        }
    }
}

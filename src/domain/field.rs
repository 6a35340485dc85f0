// ==========================================
// 投资人批量导入 - 目标字段目录
// ==========================================
// 职责: 固定、有序的标准字段列表（key / 显示名 / 必填 / 类型）
// 红线: 纯数据，运行期不可变；恰好一个必填字段
// ==========================================

use crate::domain::types::FieldKind;
use serde::Serialize;

/// 字段目录版本号（字段增删时递增）
pub const CATALOG_VERSION: &str = "v1";

// ==========================================
// MappableField - 可映射字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MappableField {
    pub key: &'static str,   // 唯一标识（即提交时的 JSON 键）
    pub label: &'static str, // 显示名
    pub required: bool,      // 是否必填
    pub kind: FieldKind,     // 值类型
}

impl MappableField {
    pub const fn text(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            required: false,
            kind: FieldKind::Text,
        }
    }

    pub const fn required(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            required: true,
            kind: FieldKind::Text,
        }
    }

    pub const fn numeric(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            required: false,
            kind,
        }
    }
}

// ==========================================
// 投资人档案字段（声明顺序即自动映射顺序）
// ==========================================
pub const INVESTOR_PROFILE_FIELDS: &[MappableField] = &[
    // ===== 身份 =====
    MappableField::required("investor_name", "Investor Name"),
    MappableField::text("title", "Title"),
    MappableField::text("gender", "Gender"),
    MappableField::text("nationality", "Nationality"),
    MappableField::numeric("age", "Age", FieldKind::Integer),
    MappableField::text("job_title", "Job Title"),
    // ===== 分类 =====
    MappableField::text("investor_type", "Investor Type"),
    MappableField::text("sector", "Sector"),
    MappableField::text("country", "Country"),
    MappableField::text("city", "City"),
    MappableField::text("website", "Website"),
    MappableField::text("description", "Description"),
    // ===== 投资额 =====
    MappableField::text("wealth", "Wealth"),
    MappableField::numeric("expected_ticket_amount", "Expected Ticket Amount", FieldKind::Decimal),
    MappableField::text("expected_ticket_currency", "Ticket Currency"),
    // ===== 联系人 =====
    MappableField::text("contact_name", "Contact Name"),
    MappableField::text("contact_title", "Contact Title"),
    MappableField::text("contact_phone", "Contact Phone"),
    MappableField::text("contact_email", "Contact Email"),
    MappableField::text("contact_whatsapp", "Contact WhatsApp"),
    // ===== 关系 =====
    MappableField::text("relationship_strength", "Relationship Strength"),
    MappableField::text("decision_role", "Decision Role"),
    MappableField::text("preferred_intro_path", "Preferred Intro Path"),
];

// ==========================================
// FieldCatalog - 字段目录
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct FieldCatalog {
    fields: &'static [MappableField],
}

impl FieldCatalog {
    pub const fn new(fields: &'static [MappableField]) -> Self {
        Self { fields }
    }

    /// 投资人档案目录
    pub const fn investor_profile() -> Self {
        Self::new(INVESTOR_PROFILE_FIELDS)
    }

    pub fn fields(&self) -> &'static [MappableField] {
        self.fields
    }

    pub fn get(&self, key: &str) -> Option<&'static MappableField> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static MappableField> {
        self.fields.iter().filter(|f| f.required)
    }

    /// 主身份字段（第一个必填字段），用作导入错误的行标识
    pub fn identity_field(&self) -> Option<&'static MappableField> {
        self.required_fields().next()
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::investor_profile()
    }
}

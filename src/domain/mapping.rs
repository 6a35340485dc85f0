// ==========================================
// 投资人批量导入 - 字段映射
// ==========================================
// 职责: 标准字段 key → 文件表头 的对应关系
// 说明: 唯一性由候选列表过滤维持，本结构本身不做拒绝
// ==========================================

use crate::domain::field::FieldCatalog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    entries: BTreeMap<String, String>, // field_key → header
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field_key: &str) -> Option<&str> {
        self.entries.get(field_key).map(String::as_str)
    }

    /// 覆写（Some）或清除（None）某字段的映射
    pub fn set(&mut self, field_key: &str, header: Option<String>) {
        match header {
            Some(h) => {
                self.entries.insert(field_key.to_string(), h);
            }
            None => {
                self.entries.remove(field_key);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 已映射字段数
    pub fn mapped_count(&self) -> usize {
        self.entries.len()
    }

    /// 被其它字段占用的表头（不含 field_key 自身的选择）
    pub fn headers_used_by_others<'a>(&'a self, field_key: &'a str) -> impl Iterator<Item = &'a str> {
        self.entries
            .iter()
            .filter(move |(k, _)| k.as_str() != field_key)
            .map(|(_, v)| v.as_str())
    }

    /// 所有必填字段均已映射
    pub fn is_complete(&self, catalog: &FieldCatalog) -> bool {
        catalog
            .required_fields()
            .all(|f| self.get(f.key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_clear() {
        let mut mapping = FieldMapping::new();
        mapping.set("investor_name", Some("Name".to_string()));
        assert_eq!(mapping.get("investor_name"), Some("Name"));

        mapping.set("investor_name", None);
        assert_eq!(mapping.get("investor_name"), None);
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_is_complete_requires_identity() {
        let catalog = FieldCatalog::investor_profile();
        let mut mapping = FieldMapping::new();
        mapping.set("contact_email", Some("Email".to_string()));
        assert!(!mapping.is_complete(&catalog));

        mapping.set("investor_name", Some("Name".to_string()));
        assert!(mapping.is_complete(&catalog));
    }
}

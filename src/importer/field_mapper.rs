// ==========================================
// 投资人批量导入 - 字段映射器实现
// ==========================================
// 职责: 表头 → 标准字段 的自动建议 + 手工修改 + 候选列表
// 说明: 启发式匹配仅为便利，用户导入前总能覆写
// ==========================================

use crate::domain::field::{FieldCatalog, MappableField};
use crate::domain::mapping::FieldMapping;
use crate::importer::importer_trait::FieldMapper as FieldMapperTrait;
use std::collections::HashSet;
use tracing::debug;

pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    /// 按目录声明顺序逐个字段匹配，取第一个命中的表头
    ///
    /// 命中条件（任一）:
    /// 1. 表头归一化 == 字段 key 归一化
    /// 2. 表头小写包含显示名首词小写
    ///
    /// 已被前序字段认领的表头不再参与匹配，建议结果保持单射
    fn suggest(&self, headers: &[String], catalog: &FieldCatalog) -> FieldMapping {
        let mut mapping = FieldMapping::new();
        let mut claimed: HashSet<&str> = HashSet::new();

        for field in catalog.fields() {
            let hit = headers
                .iter()
                .filter(|h| !claimed.contains(h.as_str()))
                .find(|h| Self::header_matches(h, field));

            if let Some(header) = hit {
                debug!(field = field.key, header = %header, "自动映射命中");
                claimed.insert(header.as_str());
                mapping.set(field.key, Some(header.clone()));
            }
        }

        mapping
    }

    fn set_mapping(
        &self,
        current: &FieldMapping,
        field_key: &str,
        header: Option<&str>,
    ) -> FieldMapping {
        let mut next = current.clone();
        next.set(field_key, header.map(str::to_string));
        next
    }
}

impl FieldMapper {
    /// 归一化：小写，去掉下划线/空格/连字符
    pub fn normalize(value: &str) -> String {
        value
            .chars()
            .filter(|c| !matches!(c, '_' | ' ' | '-'))
            .flat_map(char::to_lowercase)
            .collect()
    }

    fn header_matches(header: &str, field: &MappableField) -> bool {
        if Self::normalize(header) == Self::normalize(field.key) {
            return true;
        }

        match field.label.split_whitespace().next() {
            Some(first_word) => header
                .to_lowercase()
                .contains(&first_word.to_lowercase()),
            None => false,
        }
    }

    /// 某字段可选的表头：排除已被其它字段占用的，保留自身当前选择
    pub fn candidates(headers: &[String], mapping: &FieldMapping, field_key: &str) -> Vec<String> {
        let used: HashSet<&str> = mapping.headers_used_by_others(field_key).collect();

        headers
            .iter()
            .filter(|h| !used.contains(h.as_str()))
            .cloned()
            .collect()
    }
}

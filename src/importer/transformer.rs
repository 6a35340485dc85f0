// ==========================================
// 投资人批量导入 - 转换与校验
// ==========================================
// 职责: 按映射把行转换为记录 → 数值字段类型转换 → 必填校验分区
// 附加: 文件内主身份值重复检测（仅提示，不拦截）
// ==========================================

use crate::domain::dataset::{ParsedDataset, RawRow};
use crate::domain::field::{FieldCatalog, MappableField};
use crate::domain::import::{ReviewSummary, TransformedRecord};
use crate::domain::mapping::FieldMapping;
use crate::domain::types::{FieldKind, FieldValue};
use std::collections::HashMap;
use tracing::{debug, info};

/// 分区结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub valid_rows: Vec<TransformedRecord>, // 可提交
    pub skipped_count: usize,               // 缺必填字段被跳过
}

pub struct Transformer {
    catalog: FieldCatalog,
}

impl Transformer {
    pub fn new(catalog: FieldCatalog) -> Self {
        Self { catalog }
    }

    /// 逐行应用映射
    ///
    /// 未映射字段、源值为空的字段、数值解析失败的字段均不出现在记录中
    pub fn transform(&self, rows: &[RawRow], mapping: &FieldMapping) -> Vec<TransformedRecord> {
        rows.iter()
            .enumerate()
            .map(|(idx, row)| self.transform_row(idx + 1, row, mapping))
            .collect()
    }

    fn transform_row(
        &self,
        row_number: usize,
        row: &RawRow,
        mapping: &FieldMapping,
    ) -> TransformedRecord {
        let mut record = TransformedRecord::new();

        for field in self.catalog.fields() {
            let Some(header) = mapping.get(field.key) else {
                continue;
            };
            let raw = match row.get(header) {
                Some(v) if !v.trim().is_empty() => v.trim(),
                _ => continue,
            };

            match Self::coerce(field, raw) {
                Some(value) => {
                    record.insert(field.key.to_string(), value);
                }
                None => {
                    debug!(
                        row_number,
                        field = field.key,
                        value = raw,
                        "数值字段无法解析，按未提供处理"
                    );
                }
            }
        }

        record
    }

    /// 类型转换（文本原样；数值去掉千分位逗号后解析）
    fn coerce(field: &MappableField, raw: &str) -> Option<FieldValue> {
        match field.kind {
            FieldKind::Text => Some(FieldValue::Text(raw.to_string())),
            FieldKind::Integer => {
                let cleaned = Self::strip_grouping(raw);
                cleaned
                    .parse::<i64>()
                    .ok()
                    .or_else(|| {
                        cleaned
                            .parse::<f64>()
                            .ok()
                            .filter(|v| v.is_finite() && v.fract() == 0.0)
                            .filter(|v| (i64::MIN as f64..i64::MAX as f64).contains(v))
                            .map(|v| v as i64)
                    })
                    .map(FieldValue::Integer)
            }
            FieldKind::Decimal => Self::strip_grouping(raw)
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(FieldValue::Decimal),
        }
    }

    fn strip_grouping(raw: &str) -> String {
        raw.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect()
    }

    /// 记录是否具备所有必填字段的非空值
    pub fn has_required(&self, record: &TransformedRecord) -> bool {
        self.catalog
            .required_fields()
            .all(|f| record.get(f.key).map(|v| !v.is_blank()).unwrap_or(false))
    }

    /// 分区：缺必填字段的记录计为跳过，永不提交
    pub fn partition(&self, records: Vec<TransformedRecord>) -> Partition {
        let total = records.len();
        let (valid_rows, skipped): (Vec<_>, Vec<_>) =
            records.into_iter().partition(|r| self.has_required(r));

        debug!(total, valid = valid_rows.len(), skipped = skipped.len(), "记录分区完成");
        Partition {
            valid_rows,
            skipped_count: skipped.len(),
        }
    }

    /// 文件内重复的主身份值（大小写不敏感，返回首次出现的写法）
    pub fn detect_duplicates(&self, records: &[TransformedRecord]) -> Vec<String> {
        let Some(identity) = self.catalog.identity_field() else {
            return Vec::new();
        };

        let mut first_seen: HashMap<String, (String, usize)> = HashMap::new();
        let mut duplicates = Vec::new();

        for record in records {
            let Some(value) = record.get(identity.key) else {
                continue;
            };
            let name = value.as_text();
            let entry = first_seen
                .entry(name.to_lowercase())
                .or_insert_with(|| (name, 0));
            entry.1 += 1;
            if entry.1 == 2 {
                duplicates.push(entry.0.clone());
            }
        }

        duplicates
    }

    /// 复核汇总（仅展示用）
    pub fn summarize(&self, dataset: &ParsedDataset, mapping: &FieldMapping) -> ReviewSummary {
        let records = self.transform(&dataset.rows, mapping);
        let partition = self.partition(records);
        let duplicate_names = self.detect_duplicates(&partition.valid_rows);

        let summary = ReviewSummary {
            total_rows: dataset.rows.len(),
            valid_rows: partition.valid_rows.len(),
            skipped_rows: partition.skipped_count,
            mapped_fields: mapping.mapped_count(),
            duplicate_names,
        };
        info!(
            total = summary.total_rows,
            valid = summary.valid_rows,
            skipped = summary.skipped_rows,
            mapped = summary.mapped_fields,
            "复核汇总"
        );
        summary
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new(FieldCatalog::investor_profile())
    }
}

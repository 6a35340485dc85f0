// ==========================================
// 投资人批量导入 - 导入管道 Trait
// ==========================================
// 职责: 定义各阶段接口（不包含实现）
// 流程: 解析 → 映射 → 转换/校验 → 分波次提交
// ==========================================

use crate::domain::dataset::ParsedTable;
use crate::domain::field::FieldCatalog;
use crate::domain::import::{ImportContext, ImportResult, TransformedRecord};
use crate::domain::mapping::FieldMapping;
use crate::importer::error::{ImporterResult, ParseError};
use async_trait::async_trait;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文本 → 表头 + 行记录（阶段 0）
// 实现者: CsvParser
pub trait FileParser: Send + Sync {
    /// 解析文本为表头与行记录
    ///
    /// # 返回
    /// - Ok(ParsedTable): 可能零数据行（由调用方判定是否可用）
    /// - Err(ParseError): 空文件 / 无表头
    fn parse_text(&self, text: &str) -> Result<ParsedTable, ParseError>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 列 → 标准字段映射（阶段 1）
// 实现者: FieldMapper
pub trait FieldMapper: Send + Sync {
    /// 根据表头给出初始映射建议
    fn suggest(&self, headers: &[String], catalog: &FieldCatalog) -> FieldMapping;

    /// 手工修改映射（覆写或清除，不做唯一性拒绝）
    fn set_mapping(
        &self,
        current: &FieldMapping,
        field_key: &str,
        header: Option<&str>,
    ) -> FieldMapping;
}

// ==========================================
// BatchSubmitter Trait
// ==========================================
// 用途: 有效记录分波次提交（阶段 3）
// 实现者: BatchImporter
#[async_trait]
pub trait BatchSubmitter: Send + Sync {
    /// 提交全部有效记录
    ///
    /// # 返回
    /// - Ok(ImportResult): 单行失败已聚合在结果内
    /// - Err: 仅整体性失败（上下文缺失、后端不可达）
    async fn import_all(
        &self,
        valid_rows: &[TransformedRecord],
        context: &ImportContext,
    ) -> ImporterResult<ImportResult>;
}

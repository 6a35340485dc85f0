// ==========================================
// 投资人批量导入 - 领域模型层
// ==========================================
// 职责: 定义数据集、字段目录、映射、导入结果等纯数据类型
// 红线: 不含解析逻辑，不含网络访问
// ==========================================

pub mod dataset;
pub mod field;
pub mod import;
pub mod mapping;
pub mod types;

// 重导出核心类型
pub use dataset::{ParsedDataset, ParsedTable, RawRow};
pub use field::{FieldCatalog, MappableField, CATALOG_VERSION, INVESTOR_PROFILE_FIELDS};
pub use import::{
    ImportContext, ImportResult, ReviewSummary, RowError, TransformedRecord,
    SPREADSHEET_IMPORT_SOURCE,
};
pub use mapping::FieldMapping;
pub use types::{FieldKind, FieldValue, WizardStep};

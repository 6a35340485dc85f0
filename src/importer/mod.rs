// ==========================================
// 投资人批量导入 - 导入层
// ==========================================
// 职责: 文件 → 表头/行 → 字段映射 → 记录 → 分波次提交
// 支持: CSV（逗号分隔，双引号转义）
// ==========================================

// 模块声明
pub mod batch_importer;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod transformer;

// 重导出核心类型
pub use batch_importer::{
    plan_waves, BatchImporter, DEFAULT_WAVE_DELAY, DEFAULT_WAVE_SIZE, IMPORT_FAILURE_FALLBACK,
};
pub use error::{ImportError, ImporterResult, ParseError};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{
    decode_text, parse, read_csv_file, validate_file, CsvParser, SelectedFile,
    DEFAULT_MAX_FILE_BYTES,
};
pub use transformer::{Partition, Transformer};

// 重导出 Trait 接口
pub use importer_trait::{BatchSubmitter, FieldMapper, FileParser};

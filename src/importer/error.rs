// ==========================================
// 投资人批量导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 解析错误（以结构化结果返回，不 panic）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty file")]
    EmptyFile,

    #[error("No headers found")]
    NoHeaders,

    /// 由调用方（向导）在解析得到零数据行时判定
    #[error("No data rows found")]
    NoDataRows,
}

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件过大: {size} 字节（上限 {limit} 字节）")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    // ===== 导入执行错误 =====
    #[error("导入上下文缺失: {0}")]
    MissingContext(String),

    #[error("后端不可达（第 {wave} 波全部连接失败）: {message}")]
    BackendUnreachable { wave: usize, message: String },
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ImportError::FileNotFound(err.to_string()),
            _ => ImportError::FileReadError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type ImporterResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_messages() {
        assert_eq!(ParseError::EmptyFile.to_string(), "Empty file");
        assert_eq!(ParseError::NoHeaders.to_string(), "No headers found");
        assert_eq!(ParseError::NoDataRows.to_string(), "No data rows found");
    }

    #[test]
    fn test_parse_error_is_transparent() {
        let err: ImportError = ParseError::EmptyFile.into();
        assert_eq!(err.to_string(), "Empty file");
    }
}

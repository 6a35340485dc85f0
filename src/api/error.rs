// ==========================================
// 投资人批量导入 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把下层错误转换为面向用户的提示
// ==========================================

use crate::config::error::ConfigError;
use crate::importer::error::{ImportError, ParseError};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 向导流程错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("尚未选择文件")]
    NoDataset,

    #[error("必填字段未映射: {0}")]
    MappingIncomplete(String),

    #[error("没有可导入的有效行")]
    NothingToImport,

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("导入正在进行中")]
    ImportInProgress,

    // ==========================================
    // 文件与解析错误
    // ==========================================
    #[error("文件不可用: {0}")]
    FileRejected(String),

    /// 解析失败，原文直接展示给用户
    #[error("{0}")]
    ParseFailed(ParseError),

    // ==========================================
    // 导入执行错误
    // ==========================================
    #[error("后端不可达: {0}")]
    BackendUnreachable(String),

    #[error("后端调用失败: {0}")]
    BackendError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),
}

impl ApiError {
    /// 是否为用户可自行修正的问题（文件/映射/状态），而非系统故障
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidInput(_)
                | ApiError::InvalidStateTransition { .. }
                | ApiError::NoDataset
                | ApiError::MappingIncomplete(_)
                | ApiError::NothingToImport
                | ApiError::ImportInProgress
                | ApiError::FileRejected(_)
                | ApiError::ParseFailed(_)
        )
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(_)
            | ImportError::UnsupportedFormat(_)
            | ImportError::FileTooLarge { .. }
            | ImportError::FileReadError(_) => ApiError::FileRejected(err.to_string()),
            ImportError::Parse(parse_err) => ApiError::ParseFailed(parse_err),
            ImportError::MissingContext(msg) => ApiError::InvalidInput(msg),
            ImportError::BackendUnreachable { .. } => ApiError::BackendUnreachable(err.to_string()),
        }
    }
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        ApiError::ParseFailed(err)
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Unreachable(msg) => ApiError::BackendUnreachable(msg),
            RepositoryError::Config(msg) => ApiError::ConfigError(msg),
            other => ApiError::BackendError(other.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

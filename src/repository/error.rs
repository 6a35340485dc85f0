// ==========================================
// 投资人批量导入 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型（远端创建接口）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    // ===== 服务端拒绝 =====
    /// 非 2xx 响应；detail 为响应体中的说明字段（可能缺失）
    #[error("服务端拒绝 (status={status}): {}", .detail.as_deref().unwrap_or("无说明"))]
    Rejected { status: u16, detail: Option<String> },

    // ===== 传输错误 =====
    #[error("后端不可达: {0}")]
    Unreachable(String),

    #[error("请求失败: {0}")]
    Transport(String),

    // ===== 配置错误 =====
    #[error("客户端配置错误: {0}")]
    Config(String),
}

impl RepositoryError {
    /// 连接层失败（后端整体不可达）
    pub fn is_unreachable(&self) -> bool {
        matches!(self, RepositoryError::Unreachable(_))
    }
}

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            RepositoryError::Unreachable(err.to_string())
        } else if err.is_builder() {
            RepositoryError::Config(err.to_string())
        } else {
            RepositoryError::Transport(err.to_string())
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

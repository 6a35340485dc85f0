// ==========================================
// 投资人批量导入 - 数据仓储层
// ==========================================
// 职责: 远端后端接口访问（外部协作方）
// 红线: 只做调用与错误归类，不含业务规则
// ==========================================

pub mod error;
pub mod investor_profile_repo;
pub mod investor_profile_repo_impl;

// 重导出
pub use error::{RepositoryError, RepositoryResult};
pub use investor_profile_repo::InvestorProfileRepository;
pub use investor_profile_repo_impl::HttpInvestorProfileRepository;

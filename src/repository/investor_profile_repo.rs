// ==========================================
// 投资人批量导入 - 投资人档案 Repository Trait
// ==========================================
// 职责: 定义远端档案创建接口（不包含业务逻辑）
// 红线: Repository 不做重试、不做唯一性判断，重复由服务端裁决
// ==========================================

use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use serde_json::{Map, Value};

// ==========================================
// InvestorProfileRepository Trait
// ==========================================
// 用途: 单条档案创建（每个有效行一次调用）
// 实现者: HttpInvestorProfileRepository（使用 reqwest）
#[async_trait]
pub trait InvestorProfileRepository: Send + Sync {
    /// 创建一条投资人档案
    ///
    /// # 参数
    /// - payload: 记录字段 + 上下文字段（fund_id / source）组成的 JSON 对象
    ///
    /// # 返回
    /// - Ok(()): 2xx
    /// - Err(RepositoryError::Rejected): 非 2xx，带服务端说明
    /// - Err(其它): 传输层失败
    async fn create_profile(&self, payload: Map<String, Value>) -> RepositoryResult<()>;
}

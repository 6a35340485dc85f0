// ==========================================
// 投资人批量导入 - 投资人档案 Repository 实现
// ==========================================
// 远端: POST {base_url}/api/investor-profiles
// 鉴权: Bearer Token
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::investor_profile_repo::InvestorProfileRepository;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

const CREATE_PROFILE_PATH: &str = "api/investor-profiles";

// ==========================================
// HttpInvestorProfileRepository
// ==========================================
pub struct HttpInvestorProfileRepository {
    client: reqwest::Client,
    endpoint: String,
    api_token: String,
}

impl HttpInvestorProfileRepository {
    /// 创建新的 HttpInvestorProfileRepository 实例
    ///
    /// # 参数
    /// - base_url: 后端根地址（末尾斜杠可有可无）
    /// - api_token: Bearer Token
    /// - timeout: 单次请求超时
    pub fn new(base_url: &str, api_token: &str, timeout: Duration) -> RepositoryResult<Self> {
        let base_url = base_url.trim();
        if base_url.is_empty() {
            return Err(RepositoryError::Config("api_base_url 未配置".to_string()));
        }
        if api_token.trim().is_empty() {
            return Err(RepositoryError::Config("api_token 未配置".to_string()));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: Self::join_url(base_url, CREATE_PROFILE_PATH),
            api_token: api_token.trim().to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn join_url(base_url: &str, path: &str) -> String {
        if base_url.ends_with('/') {
            format!("{}{}", base_url, path)
        } else {
            format!("{}/{}", base_url, path)
        }
    }

    /// 从错误响应体提取说明文字
    ///
    /// - {"detail": "..."} → 原文
    /// - {"detail": [{"msg": "..."}, ...]} → 各条 msg 以 "; " 拼接
    /// - 其它 → None
    pub fn extract_detail(body: &str) -> Option<String> {
        let json: Value = serde_json::from_str(body).ok()?;

        match &json["detail"] {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item["msg"].as_str())
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            _ => None,
        }
    }
}

#[async_trait]
impl InvestorProfileRepository for HttpInvestorProfileRepository {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn create_profile(&self, payload: Map<String, Value>) -> RepositoryResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "档案创建成功");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(RepositoryError::Rejected {
            status: status.as_u16(),
            detail: Self::extract_detail(&body),
        })
    }
}

// 共享实例（向导与导入器共用同一客户端）
#[async_trait]
impl<T> InvestorProfileRepository for Arc<T>
where
    T: InvestorProfileRepository + ?Sized,
{
    async fn create_profile(&self, payload: Map<String, Value>) -> RepositoryResult<()> {
        (**self).create_profile(payload).await
    }
}

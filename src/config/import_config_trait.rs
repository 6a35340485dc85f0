// ==========================================
// 投资人批量导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入流程所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入流程所需的配置读取接口
// 实现者: ConfigManager（默认值 < 配置文件 < 环境变量）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== 后端连接配置 =====

    /// 获取后端根地址
    ///
    /// # 默认值
    /// - http://localhost:8000
    async fn get_api_base_url(&self) -> ConfigResult<String>;

    /// 获取 Bearer Token
    ///
    /// # 返回
    /// - Err(ConfigError::Missing): 未配置（无默认值）
    async fn get_api_token(&self) -> ConfigResult<String>;

    /// 获取单次请求超时
    ///
    /// # 默认值
    /// - 30 秒
    async fn get_request_timeout(&self) -> ConfigResult<Duration>;

    // ===== 导入上下文配置 =====

    /// 获取目标基金ID
    ///
    /// # 返回
    /// - Ok(None): 未配置（由调用方另行提供）
    async fn get_fund_id(&self) -> ConfigResult<Option<String>>;

    // ===== 分波次配置 =====

    /// 获取波次大小
    ///
    /// # 默认值
    /// - 5
    async fn get_wave_size(&self) -> ConfigResult<usize>;

    /// 获取波间间隔
    ///
    /// # 默认值
    /// - 300 毫秒
    async fn get_wave_delay(&self) -> ConfigResult<Duration>;

    // ===== 文件准入配置 =====

    /// 获取文件大小上限（字节）
    ///
    /// # 默认值
    /// - 5 MiB
    async fn get_max_file_bytes(&self) -> ConfigResult<u64>;
}

// ==========================================
// ImportSettings - 导入配置快照
// ==========================================
// 一次导入会话开始时读取，会话内不再变化
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSettings {
    pub api_base_url: String,
    #[serde(skip_serializing)]
    pub api_token: Option<String>, // 缺失时由调用方决定是否报错（CLI 始终要求）
    pub request_timeout: Duration,
    pub fund_id: Option<String>,
    pub wave_size: usize,
    pub wave_delay: Duration,
    pub max_file_bytes: u64,
}

impl ImportSettings {
    /// 从配置读取器生成快照
    ///
    /// 缺失 Token 不在此处报错，由真正发起请求的一方判定
    pub async fn load(reader: &dyn ImportConfigReader) -> ConfigResult<Self> {
        Ok(Self {
            api_base_url: reader.get_api_base_url().await?,
            api_token: reader.get_api_token().await.ok(),
            request_timeout: reader.get_request_timeout().await?,
            fund_id: reader.get_fund_id().await?,
            wave_size: reader.get_wave_size().await?,
            wave_delay: reader.get_wave_delay().await?,
            max_file_bytes: reader.get_max_file_bytes().await?,
        })
    }
}

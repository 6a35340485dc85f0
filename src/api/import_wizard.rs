// ==========================================
// 投资人批量导入 - 导入向导
// ==========================================
// 职责: 三步状态机 Upload → Map → Review，组合解析/映射/转换/分波次提交
// 红线: 向导状态只属于本实例，不使用全局可变状态
// 红线: importing 标记在首波发出前置位，末波结束或出错后由守卫清除
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ImportSettings;
use crate::domain::dataset::ParsedDataset;
use crate::domain::field::FieldCatalog;
use crate::domain::import::{ImportContext, ImportResult, ReviewSummary};
use crate::domain::mapping::FieldMapping;
use crate::domain::types::WizardStep;
use crate::importer::{
    decode_text, read_csv_file, validate_file, BatchImporter, BatchSubmitter, CsvParser,
    FieldMapper, FieldMapperImpl, FileParser, ParseError, SelectedFile, Transformer,
    DEFAULT_MAX_FILE_BYTES,
};
use crate::repository::InvestorProfileRepository;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

// ==========================================
// Notification - 导入后提示
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    fn success(message: String) -> Self {
        Self {
            level: NotificationLevel::Success,
            message,
        }
    }

    fn error(message: String) -> Self {
        Self {
            level: NotificationLevel::Error,
            message,
        }
    }
}

/// 导入结果 → 汇总提示（成功数 / 失败数），单行明细只进日志
pub fn notifications(result: &ImportResult) -> Vec<Notification> {
    let mut out = Vec::new();
    if result.success_count > 0 {
        out.push(Notification::success(format!(
            "Successfully imported {} investor(s)",
            result.success_count
        )));
    }
    if result.error_count > 0 {
        out.push(Notification::error(format!(
            "{} row(s) failed to import",
            result.error_count
        )));
    }
    out
}

/// 整体失败 → 单条通用提示
pub fn failure_notification(err: &ApiError) -> Notification {
    if err.is_user_recoverable() {
        Notification::error(err.to_string())
    } else {
        Notification::error(format!("Import failed: {}", err))
    }
}

// ==========================================
// ImportingGuard - importing 标记守卫
// ==========================================
// 离开作用域（含错误返回、future 被丢弃）即清除标记
struct ImportingGuard {
    flag: Arc<AtomicBool>,
}

impl ImportingGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for ImportingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// ==========================================
// ImportWizard
// ==========================================
pub struct ImportWizard<R>
where
    R: InvestorProfileRepository,
{
    step: WizardStep,
    dataset: Option<ParsedDataset>,
    mapping: FieldMapping,
    catalog: FieldCatalog,
    context: ImportContext,
    max_file_bytes: u64,

    parser: CsvParser,
    mapper: FieldMapperImpl,
    transformer: Transformer,
    importer: BatchImporter<R>,

    importing: Arc<AtomicBool>,
}

impl<R> ImportWizard<R>
where
    R: InvestorProfileRepository,
{
    /// 创建新的 ImportWizard 实例（初始步骤 Upload）
    ///
    /// # 参数
    /// - repo: 档案创建接口
    /// - context: 合并进每一行的固定属性（目标基金等）
    pub fn new(repo: R, context: ImportContext) -> Self {
        let catalog = FieldCatalog::investor_profile();
        Self {
            step: WizardStep::Upload,
            dataset: None,
            mapping: FieldMapping::new(),
            catalog,
            context,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            parser: CsvParser,
            mapper: FieldMapperImpl,
            transformer: Transformer::new(catalog),
            importer: BatchImporter::new(repo, catalog),
            importing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 应用配置快照（波次大小、波间间隔、文件上限）
    pub fn with_settings(mut self, settings: &ImportSettings) -> Self {
        self.max_file_bytes = settings.max_file_bytes;
        self.importer = self
            .importer
            .with_wave_size(settings.wave_size)
            .with_wave_delay(settings.wave_delay);
        self
    }

    // ==========================================
    // 状态查询
    // ==========================================

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn dataset(&self) -> Option<&ParsedDataset> {
        self.dataset.as_ref()
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    pub fn context(&self) -> &ImportContext {
        &self.context
    }

    pub fn is_importing(&self) -> bool {
        self.importing.load(Ordering::Acquire)
    }

    /// 共享的 importing 标记（供界面层只读观察）
    pub fn importing_flag(&self) -> Arc<AtomicBool> {
        self.importing.clone()
    }

    // ==========================================
    // Upload 步骤：文件选择
    // ==========================================

    /// 从本地路径选择文件
    #[instrument(skip(self), fields(step = %self.step))]
    pub async fn select_file(&mut self, path: &Path) -> ApiResult<()> {
        self.require_step(WizardStep::Upload, "SELECT_FILE")?;
        let file = read_csv_file(path, self.max_file_bytes).await?;
        self.install(file)
    }

    /// 从内存字节选择文件（上传控件等场景）
    ///
    /// # 参数
    /// - file_name: 原始文件名（用于扩展名判定）
    /// - mime_type: 上传方声明的 MIME 类型
    /// - bytes: 文件内容
    pub fn load_bytes(
        &mut self,
        file_name: &str,
        mime_type: Option<&str>,
        bytes: &[u8],
    ) -> ApiResult<()> {
        self.require_step(WizardStep::Upload, "SELECT_FILE")?;
        validate_file(file_name, mime_type, bytes.len() as u64, self.max_file_bytes)?;

        self.install(SelectedFile {
            file_name: file_name.to_string(),
            size_bytes: bytes.len() as u64,
            text: decode_text(bytes),
        })
    }

    /// 解析并替换当前数据集；失败时保留原数据集
    ///
    /// 新数据集到位后重新生成映射建议，丢弃之前的手工修改
    fn install(&mut self, file: SelectedFile) -> ApiResult<()> {
        let table = match self.parser.parse_text(&file.text) {
            Ok(table) => table,
            Err(err) => {
                warn!(file_name = %file.file_name, error = %err, "文件解析失败");
                return Err(err.into());
            }
        };
        let dataset = ParsedDataset::new(file.file_name, file.size_bytes, table);
        if !dataset.is_usable() {
            warn!(file_name = %dataset.file_name, "文件无数据行");
            return Err(ParseError::NoDataRows.into());
        }

        self.mapping = self.mapper.suggest(&dataset.headers, &self.catalog);
        info!(
            file_name = %dataset.file_name,
            headers = dataset.headers.len(),
            rows = dataset.row_count(),
            suggested = self.mapping.mapped_count(),
            "文件已载入"
        );
        self.dataset = Some(dataset);
        Ok(())
    }

    /// 移除当前文件（仅 Upload 步骤）
    pub fn remove_file(&mut self) -> ApiResult<()> {
        self.require_step(WizardStep::Upload, "REMOVE_FILE")?;
        self.dataset = None;
        self.mapping.clear();
        debug!("文件已移除");
        Ok(())
    }

    // ==========================================
    // Map 步骤：手工映射
    // ==========================================

    /// 设置或清除某字段的映射列
    pub fn set_mapping(&mut self, field_key: &str, header: Option<&str>) -> ApiResult<()> {
        self.require_step(WizardStep::Map, "SET_MAPPING")?;
        let dataset = self.dataset.as_ref().ok_or(ApiError::NoDataset)?;

        if !self.catalog.contains(field_key) {
            return Err(ApiError::InvalidInput(format!("未知字段: {}", field_key)));
        }
        if let Some(h) = header {
            if !dataset.has_header(h) {
                return Err(ApiError::InvalidInput(format!("文件中无此列: {}", h)));
            }
        }

        self.mapping = self.mapper.set_mapping(&self.mapping, field_key, header);
        Ok(())
    }

    /// 某字段可选的列（已被其它字段占用的列不出现）
    pub fn candidates(&self, field_key: &str) -> Vec<String> {
        match &self.dataset {
            Some(dataset) => FieldMapperImpl::candidates(&dataset.headers, &self.mapping, field_key),
            None => Vec::new(),
        }
    }

    // ==========================================
    // 步骤导航
    // ==========================================

    /// 前进一步
    ///
    /// - Upload → Map: 需已有数据集
    /// - Map → Review: 需必填字段已映射
    pub fn next(&mut self) -> ApiResult<WizardStep> {
        let target = match self.step {
            WizardStep::Upload => {
                if self.dataset.is_none() {
                    return Err(ApiError::NoDataset);
                }
                WizardStep::Map
            }
            WizardStep::Map => {
                if let Some(missing) = self
                    .catalog
                    .required_fields()
                    .find(|f| self.mapping.get(f.key).is_none())
                {
                    return Err(ApiError::MappingIncomplete(missing.label.to_string()));
                }
                WizardStep::Review
            }
            WizardStep::Review => {
                return Err(ApiError::InvalidStateTransition {
                    from: self.step.to_string(),
                    to: "NEXT".to_string(),
                })
            }
        };

        debug!(from = %self.step, to = %target, "向导前进");
        self.step = target;
        Ok(target)
    }

    /// 后退一步（不改动数据）
    pub fn back(&mut self) -> ApiResult<WizardStep> {
        let target = match self.step {
            WizardStep::Map => WizardStep::Upload,
            WizardStep::Review => WizardStep::Map,
            WizardStep::Upload => {
                return Err(ApiError::InvalidStateTransition {
                    from: self.step.to_string(),
                    to: "BACK".to_string(),
                })
            }
        };

        debug!(from = %self.step, to = %target, "向导后退");
        self.step = target;
        Ok(target)
    }

    /// 取消：清空数据集与映射，回到 Upload，不发出任何请求
    pub fn cancel(&mut self) {
        self.dataset = None;
        self.mapping.clear();
        self.step = WizardStep::Upload;
        info!("向导已取消");
    }

    fn require_step(&self, expected: WizardStep, action: &str) -> ApiResult<()> {
        if self.step != expected {
            return Err(ApiError::InvalidStateTransition {
                from: self.step.to_string(),
                to: action.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // Review 步骤：复核与导入
    // ==========================================

    /// 复核汇总
    pub fn review_summary(&self) -> ApiResult<ReviewSummary> {
        let dataset = self.dataset.as_ref().ok_or(ApiError::NoDataset)?;
        Ok(self.transformer.summarize(dataset, &self.mapping))
    }

    /// 执行导入（仅 Review 步骤，不可重入）
    ///
    /// # 返回
    /// - Ok(ImportResult): 含部分失败
    /// - Err(ApiError::ImportInProgress): 已有导入未结束
    /// - Err(其它): 整体失败（后端不可达等），importing 标记已清除
    #[instrument(skip(self), fields(fund_id = %self.context.fund_id))]
    pub async fn run_import(&self) -> ApiResult<ImportResult> {
        let _guard = ImportingGuard::acquire(&self.importing).ok_or(ApiError::ImportInProgress)?;
        self.require_step(WizardStep::Review, "IMPORT")?;

        let dataset = self.dataset.as_ref().ok_or(ApiError::NoDataset)?;
        if !self.mapping.is_complete(&self.catalog) {
            return Err(ApiError::MappingIncomplete(
                self.catalog
                    .identity_field()
                    .map(|f| f.label.to_string())
                    .unwrap_or_default(),
            ));
        }

        let records = self.transformer.transform(&dataset.rows, &self.mapping);
        let partition = self.transformer.partition(records);
        if partition.valid_rows.is_empty() {
            return Err(ApiError::NothingToImport);
        }

        info!(
            valid = partition.valid_rows.len(),
            skipped = partition.skipped_count,
            "开始导入"
        );
        match self.importer.import_all(&partition.valid_rows, &self.context).await {
            Ok(result) => Ok(result),
            Err(err) => {
                error!(error = %err, "导入整体失败");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryResult;
    use async_trait::async_trait;
    use serde_json::{Map, Value};
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingRepo {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl InvestorProfileRepository for CountingRepo {
        async fn create_profile(&self, _payload: Map<String, Value>) -> RepositoryResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn wizard() -> ImportWizard<Arc<CountingRepo>> {
        ImportWizard::new(Arc::new(CountingRepo::default()), ImportContext::for_fund("fund-1"))
    }

    const CSV: &[u8] = b"Investor Name,Email\nJane Doe,jane@x.com\n";

    #[test]
    fn test_initial_state() {
        let w = wizard();
        assert_eq!(w.step(), WizardStep::Upload);
        assert!(w.dataset().is_none());
        assert!(w.mapping().is_empty());
        assert!(!w.is_importing());
    }

    #[test]
    fn test_load_bytes_suggests_mapping() {
        let mut w = wizard();
        w.load_bytes("investors.csv", None, CSV).unwrap();

        assert_eq!(w.dataset().unwrap().row_count(), 1);
        assert_eq!(w.mapping().get("investor_name"), Some("Investor Name"));
        assert_eq!(w.mapping().get("contact_email"), None);
        assert_eq!(w.mapping().mapped_count(), 1);
    }

    #[test]
    fn test_upload_requires_dataset() {
        let mut w = wizard();
        assert!(matches!(w.next(), Err(ApiError::NoDataset)));
        assert_eq!(w.step(), WizardStep::Upload);
    }

    #[test]
    fn test_header_only_file_reports_no_data_rows() {
        let mut w = wizard();
        let err = w.load_bytes("a.csv", None, b"a,b").unwrap_err();
        assert_eq!(err.to_string(), "No data rows found");
        assert!(w.dataset().is_none());
    }

    #[test]
    fn test_invalid_file_keeps_previous_dataset() {
        let mut w = wizard();
        w.load_bytes("investors.csv", None, CSV).unwrap();

        assert!(matches!(
            w.load_bytes("notes.txt", Some("text/plain"), b"x\ny"),
            Err(ApiError::FileRejected(_))
        ));
        assert!(w.load_bytes("empty.csv", None, b"").is_err());
        assert_eq!(w.dataset().unwrap().file_name, "investors.csv");
    }

    #[test]
    fn test_new_file_discards_manual_edits() {
        let mut w = wizard();
        w.load_bytes("investors.csv", None, CSV).unwrap();
        w.next().unwrap();
        w.set_mapping("contact_email", Some("Email")).unwrap();
        assert_eq!(w.mapping().get("contact_email"), Some("Email"));

        w.back().unwrap();
        w.load_bytes("investors.csv", None, CSV).unwrap();
        assert_eq!(w.mapping().get("contact_email"), None);
    }

    #[test]
    fn test_set_mapping_validates_input() {
        let mut w = wizard();
        w.load_bytes("investors.csv", None, CSV).unwrap();
        assert!(matches!(
            w.set_mapping("investor_name", None),
            Err(ApiError::InvalidStateTransition { .. })
        ));

        w.next().unwrap();
        assert!(matches!(
            w.set_mapping("no_such_field", Some("Email")),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            w.set_mapping("investor_name", Some("Phone")),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_candidates_exclude_claimed_headers() {
        let mut w = wizard();
        w.load_bytes("investors.csv", None, CSV).unwrap();
        w.next().unwrap();
        w.set_mapping("contact_email", Some("Email")).unwrap();

        let candidates = w.candidates("contact_name");
        assert!(!candidates.contains(&"Email".to_string()));
        assert!(!candidates.contains(&"Investor Name".to_string()));
        assert!(w.candidates("contact_email").contains(&"Email".to_string()));
    }

    #[test]
    fn test_back_keeps_data() {
        let mut w = wizard();
        w.load_bytes("investors.csv", None, CSV).unwrap();
        w.next().unwrap();
        w.next().unwrap();
        assert_eq!(w.step(), WizardStep::Review);
        assert!(matches!(w.next(), Err(ApiError::InvalidStateTransition { .. })));

        assert_eq!(w.back().unwrap(), WizardStep::Map);
        assert_eq!(w.back().unwrap(), WizardStep::Upload);
        assert!(w.back().is_err());
        assert!(w.dataset().is_some());
        assert_eq!(w.mapping().mapped_count(), 1);
    }

    #[test]
    fn test_notifications() {
        let result = ImportResult {
            batch_id: "b".to_string(),
            started_at: chrono::Utc::now(),
            elapsed_ms: 0,
            success_count: 3,
            error_count: 1,
            errors: Vec::new(),
        };
        let toasts = notifications(&result);

        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].level, NotificationLevel::Success);
        assert_eq!(toasts[0].message, "Successfully imported 3 investor(s)");
        assert_eq!(toasts[1].level, NotificationLevel::Error);
        assert_eq!(toasts[1].message, "1 row(s) failed to import");
    }

    #[tokio::test]
    async fn test_run_import_outside_review() {
        let w = wizard();
        assert!(matches!(
            w.run_import().await,
            Err(ApiError::InvalidStateTransition { .. })
        ));
        assert!(!w.is_importing());
    }
}

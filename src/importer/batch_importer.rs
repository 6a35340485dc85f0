// ==========================================
// 投资人批量导入 - 分波次并发导入器
// ==========================================
// 职责: 有效记录按固定大小分波，波内并发提交，波间串行 + 固定间隔
// 红线: 波内 settle-all（等待全部结束，不因单行失败提前返回）
// 红线: 单行失败只记入结果，不影响同波/后续波的其它行，不自动重试
// 例外: 第一波全部连接失败视为后端不可达，整体中止（此时尚无任何行写入）
// ==========================================

use crate::domain::field::FieldCatalog;
use crate::domain::import::{ImportContext, ImportResult, RowError, TransformedRecord};
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::importer_trait::BatchSubmitter;
use crate::repository::{InvestorProfileRepository, RepositoryError};
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 默认波次大小
pub const DEFAULT_WAVE_SIZE: usize = 5;

/// 默认波间间隔
pub const DEFAULT_WAVE_DELAY: Duration = Duration::from_millis(300);

/// 服务端未给出说明时的兜底文案
pub const IMPORT_FAILURE_FALLBACK: &str = "Failed to import";

/// 主身份值缺失时的行标识
const UNNAMED_ROW_LABEL: &str = "(unnamed)";

/// 按波次大小切分：12 行 / 每波 5 → [5, 5, 2]
pub fn plan_waves(total: usize, wave_size: usize) -> Vec<usize> {
    let wave_size = wave_size.max(1);
    (0..total)
        .step_by(wave_size)
        .map(|start| wave_size.min(total - start))
        .collect()
}

/// 单行提交结果
#[derive(Debug)]
enum RowOutcome {
    Created,
    Failed {
        error: RowError,
        unreachable: bool,
    },
}

// ==========================================
// BatchImporter
// ==========================================
pub struct BatchImporter<R>
where
    R: InvestorProfileRepository,
{
    repo: R,
    catalog: FieldCatalog,
    wave_size: usize,
    wave_delay: Duration,
}

impl<R> BatchImporter<R>
where
    R: InvestorProfileRepository,
{
    /// 创建新的 BatchImporter 实例（默认每波 5 行、波间 300ms）
    pub fn new(repo: R, catalog: FieldCatalog) -> Self {
        Self {
            repo,
            catalog,
            wave_size: DEFAULT_WAVE_SIZE,
            wave_delay: DEFAULT_WAVE_DELAY,
        }
    }

    pub fn with_wave_size(mut self, wave_size: usize) -> Self {
        self.wave_size = wave_size.max(1);
        self
    }

    pub fn with_wave_delay(mut self, wave_delay: Duration) -> Self {
        self.wave_delay = wave_delay;
        self
    }

    pub fn wave_size(&self) -> usize {
        self.wave_size
    }

    /// 行标识：主身份字段值
    fn row_label(&self, record: &TransformedRecord) -> String {
        self.catalog
            .identity_field()
            .and_then(|f| record.get(f.key))
            .map(|v| v.as_text())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| UNNAMED_ROW_LABEL.to_string())
    }

    /// 提交体 = 记录字段 + 上下文（fund_id / source）
    pub fn build_payload(record: &TransformedRecord, context: &ImportContext) -> Map<String, Value> {
        let mut payload = Map::new();
        for (key, value) in record {
            // FieldValue 为裸标量，序列化不会失败
            if let Ok(json) = serde_json::to_value(value) {
                payload.insert(key.clone(), json);
            }
        }
        payload.insert("fund_id".to_string(), Value::String(context.fund_id.clone()));
        payload.insert("source".to_string(), Value::String(context.source.clone()));
        payload
    }

    async fn submit_row(&self, record: &TransformedRecord, context: &ImportContext) -> RowOutcome {
        let payload = Self::build_payload(record, context);

        match self.repo.create_profile(payload).await {
            Ok(()) => RowOutcome::Created,
            Err(err) => {
                let message = match &err {
                    RepositoryError::Rejected {
                        detail: Some(detail),
                        ..
                    } => detail.clone(),
                    _ => IMPORT_FAILURE_FALLBACK.to_string(),
                };
                RowOutcome::Failed {
                    error: RowError {
                        row_label: self.row_label(record),
                        message,
                    },
                    unreachable: err.is_unreachable(),
                }
            }
        }
    }
}

#[async_trait]
impl<R> BatchSubmitter for BatchImporter<R>
where
    R: InvestorProfileRepository,
{
    #[instrument(skip_all, fields(batch_id, rows = valid_rows.len()))]
    async fn import_all(
        &self,
        valid_rows: &[TransformedRecord],
        context: &ImportContext,
    ) -> ImporterResult<ImportResult> {
        if context.fund_id.trim().is_empty() {
            return Err(ImportError::MissingContext("fund_id 为空".to_string()));
        }

        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        let started_at = Utc::now();
        let start = Instant::now();

        let waves: Vec<&[TransformedRecord]> = valid_rows.chunks(self.wave_size).collect();
        info!(
            rows = valid_rows.len(),
            waves = waves.len(),
            wave_size = self.wave_size,
            "开始分波次导入"
        );

        let mut success_count = 0usize;
        let mut errors: Vec<RowError> = Vec::new();

        for (wave_idx, wave) in waves.iter().enumerate() {
            let wave_no = wave_idx + 1;
            debug!(wave = wave_no, size = wave.len(), "发出本波请求");

            // 按行序发出，按行序收集（与完成先后无关）
            let outcomes = join_all(wave.iter().map(|record| self.submit_row(record, context))).await;

            let backend_down = wave_no == 1
                && outcomes
                    .iter()
                    .all(|o| matches!(o, RowOutcome::Failed { unreachable: true, .. }));

            let mut wave_failed = 0usize;
            for outcome in outcomes {
                match outcome {
                    RowOutcome::Created => success_count += 1,
                    RowOutcome::Failed { error, .. } => {
                        warn!(
                            wave = wave_no,
                            row_label = %error.row_label,
                            message = %error.message,
                            "行导入失败"
                        );
                        wave_failed += 1;
                        errors.push(error);
                    }
                }
            }
            info!(
                wave = wave_no,
                succeeded = wave.len() - wave_failed,
                failed = wave_failed,
                "本波已全部结束"
            );

            if backend_down {
                error!(wave = wave_no, rows = wave.len(), "首波全部连接失败，终止导入");
                return Err(ImportError::BackendUnreachable {
                    wave: wave_no,
                    message: format!(
                        "{} 行均未送达，后续 {} 行未提交",
                        wave.len(),
                        valid_rows.len() - wave.len()
                    ),
                });
            }

            if wave_no < waves.len() && !self.wave_delay.is_zero() {
                tokio::time::sleep(self.wave_delay).await;
            }
        }

        let result = ImportResult {
            batch_id,
            started_at,
            elapsed_ms: start.elapsed().as_millis() as u64,
            success_count,
            error_count: errors.len(),
            errors,
        };
        info!(
            success = result.success_count,
            failed = result.error_count,
            elapsed_ms = result.elapsed_ms,
            "分波次导入完成"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::FieldValue;
    use crate::repository::RepositoryResult;
    use std::sync::Mutex;

    /// 记录调用顺序；名字在 reject 列表中的行返回 400
    struct RecordingRepo {
        reject: Vec<&'static str>,
        calls: Mutex<Vec<Map<String, Value>>>,
    }

    impl RecordingRepo {
        fn new(reject: Vec<&'static str>) -> Self {
            Self {
                reject,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl InvestorProfileRepository for RecordingRepo {
        async fn create_profile(&self, payload: Map<String, Value>) -> RepositoryResult<()> {
            let name = payload["investor_name"].as_str().unwrap_or_default().to_string();
            self.calls.lock().unwrap().push(payload);
            if self.reject.contains(&name.as_str()) {
                return Err(RepositoryError::Rejected {
                    status: 400,
                    detail: Some(format!("An investor named '{}' already exists", name)),
                });
            }
            Ok(())
        }
    }

    fn record(name: &str) -> TransformedRecord {
        let mut r = TransformedRecord::new();
        r.insert("investor_name".to_string(), FieldValue::Text(name.to_string()));
        r
    }

    #[test]
    fn test_plan_waves() {
        assert_eq!(plan_waves(12, 5), vec![5, 5, 2]);
        assert_eq!(plan_waves(10, 5), vec![5, 5]);
        assert_eq!(plan_waves(0, 5), Vec::<usize>::new());
        assert_eq!(plan_waves(3, 0), vec![1, 1, 1]);
    }

    #[test]
    fn test_build_payload_merges_context() {
        let mut r = record("Jane Doe");
        r.insert("age".to_string(), FieldValue::Integer(45));
        let payload =
            BatchImporter::<RecordingRepo>::build_payload(&r, &ImportContext::for_fund("fund-1"));

        assert_eq!(payload["investor_name"], Value::String("Jane Doe".to_string()));
        assert_eq!(payload["age"], Value::from(45));
        assert_eq!(payload["fund_id"], Value::String("fund-1".to_string()));
        assert_eq!(payload["source"], Value::String("spreadsheet_import".to_string()));
    }

    #[tokio::test]
    async fn test_import_all_counts_and_errors() {
        let repo = RecordingRepo::new(vec!["Bob"]);
        let importer = BatchImporter::new(repo, FieldCatalog::investor_profile())
            .with_wave_delay(Duration::ZERO);

        let rows = vec![record("Jane"), record("Bob"), record("Ann")];
        let result = importer
            .import_all(&rows, &ImportContext::for_fund("fund-1"))
            .await
            .unwrap();

        assert_eq!(result.success_count, 2);
        assert_eq!(result.error_count, 1);
        assert_eq!(result.errors[0].row_label, "Bob");
        assert_eq!(result.errors[0].message, "An investor named 'Bob' already exists");
        assert_eq!(importer.repo.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_import_all_requires_fund_id() {
        let importer = BatchImporter::new(RecordingRepo::new(vec![]), FieldCatalog::default());
        let result = importer
            .import_all(&[record("Jane")], &ImportContext::for_fund("  "))
            .await;

        assert!(matches!(result, Err(ImportError::MissingContext(_))));
        assert!(importer.repo.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_import_all_empty_input() {
        let importer = BatchImporter::new(RecordingRepo::new(vec![]), FieldCatalog::default());
        let result = importer
            .import_all(&[], &ImportContext::for_fund("fund-1"))
            .await
            .unwrap();

        assert_eq!(result.total(), 0);
    }
}

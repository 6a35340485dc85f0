// ==========================================
// 导入向导端到端测试
// ==========================================
// 测试目标: 文件 → 映射 → 复核 → 导入 全流程，步骤守卫，重入保护，取消
// ==========================================


use investor_onboarding::api::{
    failure_notification, notifications, ApiError, ImportWizard, NotificationLevel,
};
use investor_onboarding::config::ImportSettings;
use investor_onboarding::domain::{FieldValue, ImportContext, RowError, WizardStep};
use investor_onboarding::logging;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use test_helpers::{duplicate_detail, write_csv, MockProfileRepository};

const JANE_CSV: &str = "name,email\nJane Doe,jane@x.com\n,bob@x.com\nJane Doe,jane2@x.com\n";

fn wizard(repo: &Arc<MockProfileRepository>) -> ImportWizard<Arc<MockProfileRepository>> {
    ImportWizard::new(repo.clone(), ImportContext::for_fund("fund-1"))
}

/// 载入文件并把 name/email 映射好，停在 Review
async fn wizard_in_review(
    repo: &Arc<MockProfileRepository>,
    csv: &str,
) -> ImportWizard<Arc<MockProfileRepository>> {
    let file = write_csv(csv);
    let mut w = wizard(repo);
    w.select_file(file.path()).await.expect("文件应可载入");
    w.next().unwrap();
    w.set_mapping("investor_name", Some("name")).unwrap();
    w.set_mapping("contact_email", Some("email")).unwrap();
    w.next().unwrap();
    w
}

#[tokio::test]
async fn test_end_to_end_duplicate_rejected_by_server() {
    logging::init_test();

    let repo = Arc::new(MockProfileRepository::new().rejecting_duplicates());
    let file = write_csv(JANE_CSV);
    let mut w = wizard(&repo);

    // ===== Upload =====
    w.select_file(file.path()).await.unwrap();
    assert_eq!(w.next().unwrap(), WizardStep::Map);

    // ===== Map =====
    assert!(w.mapping().get("investor_name").is_none());
    assert!(matches!(w.next(), Err(ApiError::MappingIncomplete(_))));
    assert_eq!(w.step(), WizardStep::Map);

    w.set_mapping("investor_name", Some("name")).unwrap();
    w.set_mapping("contact_email", Some("email")).unwrap();
    assert_eq!(w.next().unwrap(), WizardStep::Review);

    // ===== Review =====
    let summary = w.review_summary().unwrap();
    assert_eq!(summary.total_rows, 3);
    assert_eq!(summary.valid_rows, 2);
    assert_eq!(summary.skipped_rows, 1);
    assert_eq!(summary.mapped_fields, 2);
    assert_eq!(summary.duplicate_names, vec!["Jane Doe".to_string()]);

    let result = w.run_import().await.unwrap();
    assert_eq!(result.success_count, 1);
    assert_eq!(result.error_count, 1);
    assert_eq!(
        result.errors,
        vec![RowError {
            row_label: "Jane Doe".to_string(),
            message: duplicate_detail("Jane Doe"),
        }]
    );

    // 跳过的行从未提交
    assert_eq!(repo.call_count(), 2);
    let emails: Vec<String> = repo
        .calls()
        .iter()
        .map(|p| p["contact_email"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(emails, vec!["jane@x.com", "jane2@x.com"]);

    let toasts = notifications(&result);
    assert_eq!(toasts.len(), 2);
    assert_eq!(toasts[0].level, NotificationLevel::Success);
    assert_eq!(toasts[1].message, "1 row(s) failed to import");
    assert!(!w.is_importing());
}

#[tokio::test]
async fn test_sample_fixture_coerces_numeric_fields() {
    let repo = Arc::new(MockProfileRepository::new());
    let mut w = wizard(&repo);

    w.select_file(Path::new("tests/fixtures/investors_sample.csv"))
        .await
        .unwrap();

    let mapping = w.mapping();
    assert_eq!(mapping.get("investor_name"), Some("Investor Name"));
    assert_eq!(mapping.get("investor_type"), Some("Investor Type"));
    assert_eq!(mapping.get("country"), Some("Country"));
    assert_eq!(mapping.get("age"), Some("Age"));
    assert_eq!(
        mapping.get("expected_ticket_amount"),
        Some("Expected Ticket Amount")
    );
    assert_eq!(mapping.get("contact_email"), None);

    w.next().unwrap();
    w.set_mapping("contact_email", Some("Email")).unwrap();
    w.set_mapping("contact_phone", Some("Phone")).unwrap();
    w.next().unwrap();

    let summary = w.review_summary().unwrap();
    assert_eq!(summary.total_rows, 6);
    assert_eq!(summary.valid_rows, 5);
    assert_eq!(summary.skipped_rows, 1);
    assert_eq!(summary.duplicate_names, vec!["Jane Doe".to_string()]);

    let result = w.run_import().await.unwrap();
    assert_eq!(result.success_count, 5);

    let calls = repo.calls();
    assert_eq!(calls[0]["age"], json!(45));
    assert_eq!(calls[0]["expected_ticket_amount"], json!(1_000_000.0));
    assert_eq!(calls[0]["contact_phone"], json!("+971 50 000 0001"));
    assert_eq!(calls[1]["investor_name"], json!("Acme Capital, LLC"));
    assert!(calls[1].get("age").is_none());
    assert!(calls[1].get("contact_phone").is_none());
    assert_eq!(calls[2]["investor_name"], json!("Omar Haddad"));
    assert!(calls[2].get("age").is_none(), "unknown 不是数字");
    assert_eq!(calls[3]["investor_name"], json!("Sara \"The Closer\" Lee"));
    assert!(calls.iter().all(|p| p["source"] == "spreadsheet_import"));
}

#[tokio::test]
async fn test_cancel_from_upload_issues_no_calls() {
    let repo = Arc::new(MockProfileRepository::new());
    let file = write_csv(JANE_CSV);
    let mut w = wizard(&repo);

    w.select_file(file.path()).await.unwrap();
    w.cancel();

    assert_eq!(w.step(), WizardStep::Upload);
    assert!(w.dataset().is_none());
    assert!(w.mapping().is_empty());
    assert_eq!(repo.call_count(), 0);
}

#[tokio::test]
async fn test_cancel_from_review_resets_everything() {
    let repo = Arc::new(MockProfileRepository::new());
    let mut w = wizard_in_review(&repo, JANE_CSV).await;

    w.cancel();

    assert_eq!(w.step(), WizardStep::Upload);
    assert!(w.dataset().is_none());
    assert!(w.mapping().is_empty());
    assert!(matches!(w.next(), Err(ApiError::NoDataset)));
    assert_eq!(repo.call_count(), 0);
}

#[tokio::test]
async fn test_select_file_rejections_keep_upload_step() {
    let repo = Arc::new(MockProfileRepository::new());
    let mut w = wizard(&repo);

    let err = w
        .select_file(Path::new("/nonexistent/investors.csv"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::FileRejected(_)));

    let header_only = write_csv("name,email\n");
    let err = w.select_file(header_only.path()).await.unwrap_err();
    assert_eq!(err.to_string(), "No data rows found");

    let empty = write_csv("\n\n");
    let err = w.select_file(empty.path()).await.unwrap_err();
    assert_eq!(err.to_string(), "Empty file");

    assert_eq!(w.step(), WizardStep::Upload);
    assert!(w.dataset().is_none());
}

#[tokio::test]
async fn test_select_file_respects_configured_size_limit() {
    let repo = Arc::new(MockProfileRepository::new());
    let settings = ImportSettings {
        api_base_url: "http://localhost:8000".to_string(),
        api_token: None,
        request_timeout: Duration::from_secs(5),
        fund_id: None,
        wave_size: 5,
        wave_delay: Duration::ZERO,
        max_file_bytes: 16,
    };
    let mut w = wizard(&repo).with_settings(&settings);

    let file = write_csv(JANE_CSV);
    let err = w.select_file(file.path()).await.unwrap_err();
    assert!(matches!(err, ApiError::FileRejected(_)));
    assert!(w.dataset().is_none());
}

#[tokio::test]
async fn test_run_import_rejects_reentry() {
    let repo = Arc::new(MockProfileRepository::new().with_latency(Duration::from_millis(50)));
    let w = wizard_in_review(&repo, "name,email\nA,a@x.com\nB,b@x.com\n").await;

    let (first, second) = tokio::join!(w.run_import(), w.run_import());

    assert_eq!(first.unwrap().success_count, 2);
    assert!(matches!(second, Err(ApiError::ImportInProgress)));
    assert_eq!(repo.call_count(), 2);
    assert!(!w.is_importing());

    // 前一次结束后可再次导入
    let again = w.run_import().await.unwrap();
    assert_eq!(again.success_count, 2);
}

#[tokio::test]
async fn test_importing_flag_cleared_after_fatal_error() {
    let repo = Arc::new(MockProfileRepository::new().all_unreachable());
    let w = wizard_in_review(&repo, JANE_CSV).await;
    let flag = w.importing_flag();

    let err = w.run_import().await.unwrap_err();

    assert!(matches!(err, ApiError::BackendUnreachable(_)));
    assert!(!flag.load(std::sync::atomic::Ordering::SeqCst));
    assert!(!w.is_importing());

    let note = failure_notification(&err);
    assert_eq!(note.level, NotificationLevel::Error);
    assert!(note.message.starts_with("Import failed"));
}

#[tokio::test]
async fn test_nothing_to_import_when_every_row_lacks_identity() {
    let repo = Arc::new(MockProfileRepository::new());
    let w = wizard_in_review(&repo, "name,email\n,a@x.com\n  ,b@x.com\n").await;

    let summary = w.review_summary().unwrap();
    assert_eq!(summary.valid_rows, 0);
    assert_eq!(summary.skipped_rows, 2);

    assert!(matches!(w.run_import().await, Err(ApiError::NothingToImport)));
    assert_eq!(repo.call_count(), 0);
}

#[tokio::test]
async fn test_new_file_replaces_dataset_and_resuggests() {
    let repo = Arc::new(MockProfileRepository::new());
    let mut w = wizard(&repo);

    let first = write_csv(JANE_CSV);
    w.select_file(first.path()).await.unwrap();
    assert!(w.mapping().get("investor_name").is_none());

    let second = write_csv("Investor Name,Country\nJane Doe,UAE\n");
    w.select_file(second.path()).await.unwrap();

    let dataset = w.dataset().unwrap();
    assert_eq!(dataset.headers, vec!["Investor Name", "Country"]);
    assert_eq!(dataset.rows[0]["Country"], "UAE");
    assert_eq!(w.mapping().get("investor_name"), Some("Investor Name"));
    assert_eq!(w.mapping().get("country"), Some("Country"));
    assert_eq!(w.mapping().mapped_count(), 2);
}

#[test]
fn test_field_value_serializes_as_bare_scalar() {
    assert_eq!(serde_json::to_value(FieldValue::Integer(45)).unwrap(), json!(45));
    assert_eq!(
        serde_json::to_value(FieldValue::Text("x".to_string())).unwrap(),
        json!("x")
    );
}

// ==========================================
// 投资人批量导入 - 命令行入口
// ==========================================
// 用法:
//   investor-onboarding <FILE> [--fund-id ID] [--base-url URL] [--token TOKEN]
//                              [--map field=Header]... [--dry-run]
// 流程: 载入文件 → 自动映射 + 手工覆写 → 复核汇总 → 分波次导入
// ==========================================

use anyhow::{bail, Context, Result};
use clap::Parser;
use investor_onboarding::api::{failure_notification, notifications, ImportWizard};
use investor_onboarding::config::{config_keys, ConfigManager, ImportSettings};
use investor_onboarding::domain::ImportContext;
use investor_onboarding::repository::HttpInvestorProfileRepository;
use investor_onboarding::{logging, InvestorProfileRepository, APP_NAME, VERSION};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "investor-onboarding",
    version,
    about = "Bulk-import investor profiles from a CSV file"
)]
struct Cli {
    /// CSV 文件路径
    file: PathBuf,

    /// 目标基金ID（覆盖配置 fund_id）
    #[arg(long)]
    fund_id: Option<String>,

    /// 后端根地址（覆盖配置 api_base_url）
    #[arg(long)]
    base_url: Option<String>,

    /// Bearer Token（覆盖配置 api_token，也可用环境变量 ONBOARDING_API_TOKEN）
    #[arg(long)]
    token: Option<String>,

    /// 手工映射 field=Header，Header 为空表示清除
    #[arg(long = "map", value_parser = parse_mapping_arg)]
    mappings: Vec<(String, String)>,

    /// 只显示映射与复核汇总，不提交
    #[arg(long)]
    dry_run: bool,
}

fn parse_mapping_arg(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, header)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), header.trim().to_string()))
        }
        _ => Err(format!("映射格式应为 field=Header: {}", raw)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    tracing::info!(version = VERSION, "{} 启动", APP_NAME);

    // ===== 配置 =====
    let mut config = ConfigManager::load().context("配置加载失败")?;
    let overrides = [
        (config_keys::FUND_ID, &cli.fund_id),
        (config_keys::API_BASE_URL, &cli.base_url),
        (config_keys::API_TOKEN, &cli.token),
    ];
    for (key, value) in overrides {
        if let Some(v) = value {
            config.set_config_value(key, v.as_str())?;
        }
    }
    tracing::debug!(snapshot = %config.get_config_snapshot(), "生效配置");

    let settings = ImportSettings::load(&config).await?;
    let fund_id = settings.fund_id.clone().unwrap_or_default();
    if fund_id.is_empty() && !cli.dry_run {
        bail!("未指定目标基金（--fund-id 或配置 fund_id）");
    }
    let token = settings
        .api_token
        .clone()
        .context("未配置 api_token（--token 或 ONBOARDING_API_TOKEN）")?;

    let repo = HttpInvestorProfileRepository::new(
        &settings.api_base_url,
        &token,
        settings.request_timeout,
    )?;
    tracing::info!(endpoint = repo.endpoint(), "后端接口就绪");

    let mut wizard =
        ImportWizard::new(repo, ImportContext::for_fund(fund_id)).with_settings(&settings);

    run(&mut wizard, &cli).await
}

async fn run<R: InvestorProfileRepository>(wizard: &mut ImportWizard<R>, cli: &Cli) -> Result<()> {
    // ===== Upload =====
    wizard.select_file(&cli.file).await?;
    wizard.next()?;

    // ===== Map =====
    for (field, header) in &cli.mappings {
        let header = Some(header.as_str()).filter(|h| !h.is_empty());
        wizard.set_mapping(field, header)?;
    }

    println!("字段映射:");
    for field in wizard.catalog().fields() {
        let marker = if field.required { "*" } else { " " };
        match wizard.mapping().get(field.key) {
            Some(header) => println!(" {} {:<26} <- {}", marker, field.key, header),
            None => println!(" {} {:<26} -", marker, field.key),
        }
    }

    // ===== Review =====
    wizard.next()?;
    let summary = wizard.review_summary()?;
    println!(
        "复核: 总行数={} 有效={} 跳过={} 已映射字段={}",
        summary.total_rows, summary.valid_rows, summary.skipped_rows, summary.mapped_fields
    );
    if !summary.duplicate_names.is_empty() {
        println!("文件内重复: {}", summary.duplicate_names.join(", "));
    }

    if cli.dry_run {
        println!("dry-run: 未提交");
        return Ok(());
    }

    match wizard.run_import().await {
        Ok(result) => {
            for note in notifications(&result) {
                println!("[{:?}] {}", note.level, note.message);
            }
            for row in &result.errors {
                println!("  {}: {}", row.row_label, row.message);
            }
            println!("batch_id={} elapsed_ms={}", result.batch_id, result.elapsed_ms);
            Ok(())
        }
        Err(err) => {
            let note = failure_notification(&err);
            eprintln!("[{:?}] {}", note.level, note.message);
            Err(err.into())
        }
    }
}

//! RFP Triage CLI
//!
//! 入口：初始化日志、加载配置、创建 LLM 客户端与流水线，运行一个流程并把 JSON 结果写到 stdout。
//! 模型超时或失败时输出降级值（`"degraded": true`），进程仍以 0 退出。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;

use rfp_triage::config::load_config;
use rfp_triage::flows::{
    ComplianceInput, HttpDocumentSource, LegalRiskInput, PricingInput, SummarizeInput,
};
use rfp_triage::llm::create_client;
use rfp_triage::{observability, TriagePipeline, TriageRequest};

#[derive(Parser, Debug)]
#[command(name = "rfp-triage", version, about = "RFP triage with bounded-latency LLM analysis")]
struct Cli {
    /// 额外的配置文件（覆盖 config/default.toml）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 分析 RFP 的法律风险
    LegalRisks {
        #[arg(long)]
        url: String,
    },
    /// 下载并总结 RFP；--intake 时输出 RFP 记录
    Summarize {
        #[arg(long)]
        url: String,
        #[arg(long)]
        intake: bool,
    },
    /// 根据历史投标调整定价（输入 JSON 文件，- 表示 stdin）
    Pricing {
        #[arg(long)]
        input: PathBuf,
    },
    /// 生成合规矩阵（输入 JSON 文件，- 表示 stdin）
    Compliance {
        #[arg(long)]
        input: PathBuf,
    },
    /// 并发运行法律风险、定价、合规（输入 JSON 文件，- 表示 stdin）
    Triage {
        #[arg(long)]
        input: PathBuf,
    },
}

fn read_input<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&raw).with_context(|| format!("Invalid input JSON in {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{out}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();
    let cli = Cli::parse();

    let config = load_config(cli.config.clone()).context("Failed to load config")?;
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    tracing::info!(provider = %config.llm.provider, model = %llm.model_name(), "llm backend ready");

    let source = Arc::new(HttpDocumentSource::from_config(&config.fetch));
    let pipeline =
        TriagePipeline::from_config(&config, llm, source).context("Failed to build pipeline")?;

    match cli.command {
        Command::LegalRisks { url } => {
            let result = pipeline
                .legal_risks()
                .analyze(&LegalRiskInput { rfp_url: url })
                .await;
            print_json(&result.into_response())
        }
        Command::Summarize { url, intake } => {
            if intake {
                print_json(&pipeline.intake(&url).await)
            } else {
                let result = pipeline
                    .summarize()
                    .summarize(&SummarizeInput { rfp_url: url })
                    .await;
                print_json(&result.into_response())
            }
        }
        Command::Pricing { input } => {
            let input: PricingInput = read_input(&input)?;
            print_json(&pipeline.pricing().adjust(&input).await.into_response())
        }
        Command::Compliance { input } => {
            let input: ComplianceInput = read_input(&input)?;
            print_json(&pipeline.compliance().generate(&input).await.into_response())
        }
        Command::Triage { input } => {
            let request: TriageRequest = read_input(&input)?;
            print_json(&pipeline.triage(&request).await)
        }
    }
}

//! RFP Triage HTTP 接口
//!
//! 启动: cargo run --bin rfp-triage-web --features web
//! 所有分析接口总是返回 200 + GuardedResponse；模型超时或失败时 `degraded` 为 true。

#![cfg(feature = "web")]

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use rfp_triage::config::load_config;
use rfp_triage::flows::{
    ComplianceInput, ComplianceMatrix, HttpDocumentSource, LegalRiskInput, LegalRiskReport,
    PricingAdjustment, PricingInput, RfpSummary, SummarizeInput,
};
use rfp_triage::llm::create_client;
use rfp_triage::rfp::Rfp;
use rfp_triage::{observability, GuardedResponse, TriagePipeline, TriageReport, TriageRequest};

type AppState = Arc<TriagePipeline>;

#[derive(Debug, Deserialize)]
struct IntakeRequest {
    url: String,
}

async fn health() -> &'static str {
    "ok"
}

async fn legal_risks(
    State(pipeline): State<AppState>,
    Json(input): Json<LegalRiskInput>,
) -> Json<GuardedResponse<LegalRiskReport>> {
    Json(pipeline.legal_risks().analyze(&input).await.into_response())
}

async fn pricing(
    State(pipeline): State<AppState>,
    Json(input): Json<PricingInput>,
) -> Json<GuardedResponse<PricingAdjustment>> {
    Json(pipeline.pricing().adjust(&input).await.into_response())
}

async fn compliance(
    State(pipeline): State<AppState>,
    Json(input): Json<ComplianceInput>,
) -> Json<GuardedResponse<ComplianceMatrix>> {
    Json(pipeline.compliance().generate(&input).await.into_response())
}

async fn summarize(
    State(pipeline): State<AppState>,
    Json(input): Json<SummarizeInput>,
) -> Json<GuardedResponse<RfpSummary>> {
    Json(pipeline.summarize().summarize(&input).await.into_response())
}

async fn triage(
    State(pipeline): State<AppState>,
    Json(request): Json<TriageRequest>,
) -> Json<TriageReport> {
    Json(pipeline.triage(&request).await)
}

async fn intake(
    State(pipeline): State<AppState>,
    Json(request): Json<IntakeRequest>,
) -> Json<Rfp> {
    Json(pipeline.intake(&request.url).await)
}

fn router(pipeline: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/flows/legal-risks", post(legal_risks))
        .route("/api/flows/pricing", post(pricing))
        .route("/api/flows/compliance", post(compliance))
        .route("/api/flows/summarize", post(summarize))
        .route("/api/triage", post(triage))
        .route("/api/rfps", post(intake))
        .with_state(pipeline)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config = load_config(None).context("Failed to load config")?;
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let source = Arc::new(HttpDocumentSource::from_config(&config.fetch));
    let pipeline = Arc::new(
        TriagePipeline::from_config(&config, llm, source).context("Failed to build pipeline")?,
    );

    let listener = tokio::net::TcpListener::bind(&config.web.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.web.bind))?;
    tracing::info!(bind = %config.web.bind, "rfp-triage web listening");
    axum::serve(listener, router(pipeline))
        .await
        .context("Server error")?;
    Ok(())
}

//! 分诊流水线集成测试

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rfp_triage::config::AppConfig;
use rfp_triage::core::GenerationError;
use rfp_triage::flows::{
    BidOutcome, ComplianceInput, DocumentSource, PricingInput, ProductSpec, RequirementSpec,
    SummarizeInput,
};
use rfp_triage::guard::{FallbackCause, RecordingObserver};
use rfp_triage::llm::MockLlmClient;
use rfp_triage::rfp::{RfpStatus, RiskLevel};
use rfp_triage::{TriagePipeline, TriageRequest};
use tokio::time::Instant;

/// 内存文档源：固定返回一段正文
struct StaticSource(&'static str);

#[async_trait]
impl DocumentSource for StaticSource {
    async fn fetch(&self, _url: &str) -> Result<String, GenerationError> {
        Ok(self.0.to_string())
    }
}

/// 总是失败的文档源
struct BrokenSource;

#[async_trait]
impl DocumentSource for BrokenSource {
    async fn fetch(&self, _url: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Fetch("HTTP 404 Not Found".to_string()))
    }
}

/// 下载永不返回的文档源
struct StalledSource;

#[async_trait]
impl DocumentSource for StalledSource {
    async fn fetch(&self, _url: &str) -> Result<String, GenerationError> {
        std::future::pending::<Result<String, GenerationError>>().await
    }
}

fn spec(parameter: &str, value: &str) -> RequirementSpec {
    RequirementSpec {
        parameter: parameter.to_string(),
        value: value.to_string(),
    }
}

fn request() -> TriageRequest {
    TriageRequest {
        rfp_url: "https://example.com/rfp-002".to_string(),
        pricing: PricingInput {
            rfp_summary: "Procurement of ACSR conductors.".to_string(),
            past_bid_outcomes: vec![BidOutcome {
                bid_price: 480000.0,
                win: false,
                reason_for_loss: Some("Price".to_string()),
            }],
            current_pricing_strategy: "Premium".to_string(),
        },
        compliance: ComplianceInput {
            rfp_requirements: vec![spec("Conductor Material", "Copper")],
            product_specs: vec![ProductSpec {
                product_name: "Phoenix-A1".to_string(),
                specs: vec![spec("Conductor Material", "Copper")],
            }],
        },
    }
}

fn routed_mock() -> MockLlmClient {
    MockLlmClient::routed(vec![
        (
            "legal risks".to_string(),
            r#"{"legalRisks":[{"clause":"Payment Terms 4.1","riskLevel":"Medium","explanation":"Net 90."}],"summary":"Moderate."}"#.to_string(),
        ),
        (
            "win/loss".to_string(),
            r#"{"adjustedPricingStrategy":"Balanced","suggestedPriceAdjustmentPercentage":-2,"reasoning":"One loss on price."}"#.to_string(),
        ),
        (
            "Compare the RFP requirements".to_string(),
            r#"{"topMatchingProduct":{"productName":"Phoenix-A1","specMatchPercentage":100,"matchDetails":[]},"complianceMatrix":[{"productName":"Phoenix-A1","specMatchPercentage":100,"matchDetails":[{"requirement":"Conductor Material","rfpValue":"Copper","productValue":"Copper","match":true}]}]}"#.to_string(),
        ),
        (
            "sales agent".to_string(),
            r#"{"summary":"Supply of 110kV XLPE cables for a metro line."}"#.to_string(),
        ),
    ])
}

fn pipeline(mock: MockLlmClient, source: Arc<dyn DocumentSource>) -> TriagePipeline {
    TriagePipeline::from_config(&AppConfig::default(), Arc::new(mock), source).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_triage_all_flows_succeed() {
    let p = pipeline(routed_mock(), Arc::new(StaticSource("doc")));
    let report = p.triage(&request()).await;

    assert!(!report.degraded);
    assert_eq!(report.risk_level, Some(RiskLevel::Medium));
    assert_eq!(report.pricing.value.adjusted_pricing_strategy, "Balanced");
    assert_eq!(report.compliance.value.compliance_matrix.len(), 1);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["legalRisks"]["degraded"], false);
    assert!(json["legalRisks"].get("cause").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_triage_latency_bounded_by_largest_budget() {
    let obs = Arc::new(RecordingObserver::new());
    let p = pipeline(MockLlmClient::hanging(), Arc::new(StaticSource("doc")))
        .with_observer(obs.clone());

    let start = Instant::now();
    let report = p.triage(&request()).await;
    let elapsed = start.elapsed();

    // 三个预算 4s / 5s / 8s 并发，总耗时约 8s 而不是 17s
    assert!(elapsed >= Duration::from_millis(8000), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(8100), "{elapsed:?}");
    assert!(report.degraded);
    assert!(report.legal_risks.degraded && report.pricing.degraded && report.compliance.degraded);
    assert_eq!(report.risk_level, Some(RiskLevel::High));
    assert_eq!(obs.fallbacks().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_intake_success_awaits_review() {
    let p = pipeline(routed_mock(), Arc::new(StaticSource("110kV XLPE cables")));
    let rfp = p.intake("https://example.com/rfp-001").await;

    assert_eq!(rfp.status, RfpStatus::AwaitingReview);
    assert_eq!(rfp.title, "RFP from example.com");
    assert_eq!(rfp.summary, "Supply of 110kV XLPE cables for a metro line.");
    assert!(rfp.id.starts_with("rfp-"));
}

#[tokio::test(start_paused = true)]
async fn test_intake_broken_link_marks_error() {
    let obs = Arc::new(RecordingObserver::new());
    let p = pipeline(routed_mock(), Arc::new(BrokenSource)).with_observer(obs.clone());
    let rfps = p
        .intake_many(&[
            "https://example.com/missing".to_string(),
            "https://tenders.example.org/x".to_string(),
        ])
        .await;

    assert_eq!(rfps.len(), 2);
    assert!(rfps.iter().all(|r| r.status == RfpStatus::Error));
    assert_eq!(rfps[1].title, "Failed to process RFP from tenders.example.org");
    assert!(rfps[0].summary.starts_with("AI summary unavailable"));
    assert_eq!(obs.fallbacks().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_download_is_bounded_by_summarize_budget() {
    let obs = Arc::new(RecordingObserver::new());
    let p = pipeline(routed_mock(), Arc::new(StalledSource)).with_observer(obs.clone());
    let budget = Duration::from_millis(15000);

    let start = Instant::now();
    let result = p
        .summarize()
        .summarize(&SummarizeInput {
            rfp_url: "https://example.com/rfp-009".to_string(),
        })
        .await;
    let elapsed = start.elapsed();

    assert!(elapsed >= budget && elapsed < budget + Duration::from_millis(50), "{elapsed:?}");
    assert!(result.is_degraded());
    assert_eq!(result.cause(), Some(&FallbackCause::Timeout { budget }));
    assert_eq!(obs.fallbacks(), vec![FallbackCause::Timeout { budget }]);

    let start = Instant::now();
    let rfp = p.intake("https://example.com/rfp-009").await;
    assert!(start.elapsed() < budget + Duration::from_millis(50));
    assert_eq!(rfp.status, RfpStatus::Error);
    assert_eq!(rfp.title, "Failed to process RFP from example.com");
}

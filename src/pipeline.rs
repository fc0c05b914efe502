//! 分诊流水线：为一个 RFP 并发运行法律风险、定价、合规三个流程；以及从链接录入新 RFP
//!
//! 三个流程互相独立，总耗时受最大的预算约束，而不是预算之和。

use std::sync::Arc;

use chrono::Local;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::flows::{
    ComplianceFlow, ComplianceInput, ComplianceMatrix, DocumentSource, LegalRiskFlow,
    LegalRiskInput, LegalRiskReport, PricingAdjustment, PricingFlow, PricingInput, SummarizeFlow,
    SummarizeInput,
};
use crate::generator::StructuredGenerator;
use crate::guard::{GuardObserver, GuardSetupError, GuardedResponse};
use crate::llm::LlmClient;
use crate::rfp::{Rfp, RfpStatus, RiskLevel};

/// 一次分诊请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageRequest {
    pub rfp_url: String,
    pub pricing: PricingInput,
    pub compliance: ComplianceInput,
}

/// 分诊报告：每项都带 degraded 标记
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageReport {
    pub legal_risks: GuardedResponse<LegalRiskReport>,
    pub pricing: GuardedResponse<PricingAdjustment>,
    pub compliance: GuardedResponse<ComplianceMatrix>,
    /// 法律风险中的最高等级
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    /// 任一项使用了降级值
    pub degraded: bool,
}

/// 流水线：持有全部流程，共享同一个 Structured Generator
pub struct TriagePipeline {
    legal_risks: LegalRiskFlow,
    pricing: PricingFlow,
    compliance: ComplianceFlow,
    summarize: SummarizeFlow,
}

impl TriagePipeline {
    /// 按 [flows] 段的超时预算构建全部流程
    pub fn from_config(
        config: &AppConfig,
        llm: Arc<dyn LlmClient>,
        source: Arc<dyn DocumentSource>,
    ) -> Result<Self, GuardSetupError> {
        let generator = Arc::new(StructuredGenerator::new(llm));
        let flows = &config.flows;
        Ok(Self {
            legal_risks: LegalRiskFlow::new(generator.clone(), flows.legal_risk_timeout())?,
            pricing: PricingFlow::new(generator.clone(), flows.pricing_timeout())?,
            compliance: ComplianceFlow::new(generator.clone(), flows.compliance_timeout())?,
            summarize: SummarizeFlow::new(generator, source, flows.summarize_timeout())?,
        })
    }

    /// 所有流程使用同一个观察者
    pub fn with_observer(self, observer: Arc<dyn GuardObserver>) -> Self {
        Self {
            legal_risks: self.legal_risks.with_observer(observer.clone()),
            pricing: self.pricing.with_observer(observer.clone()),
            compliance: self.compliance.with_observer(observer.clone()),
            summarize: self.summarize.with_observer(observer),
        }
    }

    pub fn legal_risks(&self) -> &LegalRiskFlow {
        &self.legal_risks
    }

    pub fn pricing(&self) -> &PricingFlow {
        &self.pricing
    }

    pub fn compliance(&self) -> &ComplianceFlow {
        &self.compliance
    }

    pub fn summarize(&self) -> &SummarizeFlow {
        &self.summarize
    }

    /// 并发运行三个分析流程
    pub async fn triage(&self, request: &TriageRequest) -> TriageReport {
        let legal_input = LegalRiskInput {
            rfp_url: request.rfp_url.clone(),
        };
        let (legal, pricing, compliance) = tokio::join!(
            self.legal_risks.analyze(&legal_input),
            self.pricing.adjust(&request.pricing),
            self.compliance.generate(&request.compliance),
        );

        let degraded = legal.is_degraded() || pricing.is_degraded() || compliance.is_degraded();
        let risk_level = legal.value().highest_risk();
        tracing::info!(
            rfp_url = %request.rfp_url,
            degraded,
            "triage finished"
        );

        TriageReport {
            legal_risks: legal.into_response(),
            pricing: pricing.into_response(),
            compliance: compliance.into_response(),
            risk_level,
            degraded,
        }
    }

    /// 从链接录入一个 RFP：摘要成功则待审核，降级则标记为 Error
    pub async fn intake(&self, url: &str) -> Rfp {
        let id = format!("rfp-{}", &Uuid::new_v4().simple().to_string()[..8]);
        let placeholder = Rfp::placeholder(id, url.trim(), Local::now().date_naive());

        let result = self
            .summarize
            .summarize(&SummarizeInput {
                rfp_url: placeholder.url.clone(),
            })
            .await;

        let degraded = result.is_degraded();
        let title = match placeholder.host() {
            Some(host) if !degraded => format!("RFP from {host}"),
            Some(host) => format!("Failed to process RFP from {host}"),
            None => "Failed to process RFP".to_string(),
        };
        Rfp {
            title,
            summary: result.into_value().summary,
            status: if degraded {
                RfpStatus::Error
            } else {
                RfpStatus::AwaitingReview
            },
            ..placeholder
        }
    }

    /// 并发录入多个链接，结果顺序与输入一致
    pub async fn intake_many(&self, urls: &[String]) -> Vec<Rfp> {
        join_all(urls.iter().map(|url| self.intake(url))).await
    }
}

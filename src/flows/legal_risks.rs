//! 法律风险分析：给定 RFP 链接，列出风险条款（5 秒预算）

use std::sync::Arc;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::flows::validate_rfp_url;
use crate::generator::{Bindings, GenerationPlan, PromptInput, PromptTemplate, StructuredGenerator};
use crate::guard::{GuardObserver, GuardSetupError, GuardedCall, GuardedResult};
use crate::rfp::RiskLevel;
use crate::schema::OutputSchema;

pub const LEGAL_RISK_TIMEOUT: Duration = Duration::from_millis(5000);

const LEGAL_RISK_PROMPT: &str = "Analyze the RFP for legal risks.

URL: {rfp_url}

Output a JSON object with:
1. \"legalRisks\": Array of objects with \"clause\", \"riskLevel\" (High/Medium/Low), and \"explanation\".
2. \"summary\": Brief summary.";

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LegalRiskInput {
    /// RFP 文档链接
    pub rfp_url: String,
}

impl PromptInput for LegalRiskInput {
    fn bindings(&self) -> Bindings {
        Bindings::from([("rfp_url".to_string(), self.rfp_url.trim().to_string())])
    }

    fn validate(&self) -> Result<(), String> {
        validate_rfp_url(&self.rfp_url)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LegalRisk {
    /// 被识别为风险的条款
    pub clause: String,
    pub risk_level: RiskLevel,
    /// 风险原因
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LegalRiskReport {
    pub legal_risks: Vec<LegalRisk>,
    pub summary: String,
}

impl OutputSchema for LegalRiskReport {}

impl LegalRiskReport {
    /// 最高风险等级；无风险时为 None
    pub fn highest_risk(&self) -> Option<RiskLevel> {
        let rank = |level: RiskLevel| match level {
            RiskLevel::High => 2,
            RiskLevel::Medium => 1,
            RiskLevel::Low => 0,
        };
        self.legal_risks
            .iter()
            .map(|r| r.risk_level)
            .max_by_key(|level| rank(*level))
    }
}

/// 模型超时或失败时展示的典型风险（与文档类型无关的静态清单）
pub fn fallback_report() -> LegalRiskReport {
    LegalRiskReport {
        summary: "AI analysis timed out. Showing typical risks for this document type.".to_string(),
        legal_risks: vec![
            LegalRisk {
                clause: "Indemnification Clause 12.4".to_string(),
                risk_level: RiskLevel::High,
                explanation: "Unlimited liability for indirect damages.".to_string(),
            },
            LegalRisk {
                clause: "Payment Terms 4.1".to_string(),
                risk_level: RiskLevel::Medium,
                explanation: "Net 90 days payment terms exceed standard Net 30.".to_string(),
            },
            LegalRisk {
                clause: "IP Rights 8.2".to_string(),
                risk_level: RiskLevel::Low,
                explanation: "Ambiguous wording regarding pre-existing IP.".to_string(),
            },
        ],
    }
}

/// 法律风险流程
pub struct LegalRiskFlow {
    generator: Arc<StructuredGenerator>,
    plan: GenerationPlan<LegalRiskInput, LegalRiskReport>,
    guard: GuardedCall<LegalRiskReport>,
}

impl LegalRiskFlow {
    pub fn new(generator: Arc<StructuredGenerator>, timeout: Duration) -> Result<Self, GuardSetupError> {
        Ok(Self {
            generator,
            plan: GenerationPlan::new(PromptTemplate::new(
                "analyzeRfpForLegalRisks",
                LEGAL_RISK_PROMPT,
            ))
            .map_err(|e| GuardSetupError::schema("legal_risks", e))?,
            guard: GuardedCall::new("legal_risks", timeout, fallback_report())?,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn GuardObserver>) -> Self {
        self.guard = self.guard.with_observer(observer);
        self
    }

    pub async fn analyze(&self, input: &LegalRiskInput) -> GuardedResult<LegalRiskReport> {
        self.guard
            .run(|| self.generator.generate(&self.plan, input))
            .await
    }
}

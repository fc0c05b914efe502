//! RFP 摘要：下载文档后让模型总结关键要求
//!
//! 下载也在 Guarded Call 的预算之内，链接失效或站点缓慢同样走降级。

use std::sync::Arc;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::GenerationError;
use crate::flows::{validate_rfp_url, DocumentSource};
use crate::generator::{Bindings, GenerationPlan, PromptInput, PromptTemplate, StructuredGenerator};
use crate::guard::{GuardObserver, GuardSetupError, GuardedCall, GuardedResult};
use crate::schema::OutputSchema;

pub const SUMMARIZE_TIMEOUT: Duration = Duration::from_millis(15000);

const SUMMARIZE_PROMPT: &str = "You are a sales agent whose job is to understand and summarize RFP documents.

Summarize the key requirements of the RFP document downloaded from the following URL: {rfp_url}. Provide a concise summary so that a sales agent can quickly determine if it's a good fit for our products.

Document:
{document}

Output a JSON object with:
1. \"summary\": Concise summary.";

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeInput {
    pub rfp_url: String,
}

/// 实际送入模板的输入：链接 + 已下载的正文
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct SummaryPrompt {
    rfp_url: String,
    document: String,
}

impl PromptInput for SummaryPrompt {
    fn bindings(&self) -> Bindings {
        Bindings::from([
            ("rfp_url".to_string(), self.rfp_url.clone()),
            ("document".to_string(), self.document.clone()),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RfpSummary {
    pub summary: String,
}

impl OutputSchema for RfpSummary {
    fn check(&self) -> Result<(), String> {
        if self.summary.trim().is_empty() {
            return Err("summary must not be empty".to_string());
        }
        Ok(())
    }
}

pub fn fallback_summary() -> RfpSummary {
    RfpSummary {
        summary: "AI summary unavailable: the document could not be analyzed in time. Please review the RFP manually.".to_string(),
    }
}

/// 摘要流程
pub struct SummarizeFlow {
    generator: Arc<StructuredGenerator>,
    source: Arc<dyn DocumentSource>,
    plan: GenerationPlan<SummaryPrompt, RfpSummary>,
    guard: GuardedCall<RfpSummary>,
}

impl SummarizeFlow {
    pub fn new(
        generator: Arc<StructuredGenerator>,
        source: Arc<dyn DocumentSource>,
        timeout: Duration,
    ) -> Result<Self, GuardSetupError> {
        Ok(Self {
            generator,
            source,
            plan: GenerationPlan::new(PromptTemplate::new(
                "summarizeRfp",
                SUMMARIZE_PROMPT,
            ))
            .map_err(|e| GuardSetupError::schema("summarize", e))?,
            guard: GuardedCall::new("summarize", timeout, fallback_summary())?,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn GuardObserver>) -> Self {
        self.guard = self.guard.with_observer(observer);
        self
    }

    pub async fn summarize(&self, input: &SummarizeInput) -> GuardedResult<RfpSummary> {
        self.guard.run(|| self.fetch_and_generate(input)).await
    }

    async fn fetch_and_generate(&self, input: &SummarizeInput) -> Result<RfpSummary, GenerationError> {
        let url = input.rfp_url.trim();
        validate_rfp_url(url).map_err(GenerationError::InvalidInput)?;
        let document = self.source.fetch(url).await?;
        let prompt = SummaryPrompt {
            rfp_url: url.to_string(),
            document,
        };
        self.generator.generate(&self.plan, &prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaValidator;

    #[test]
    fn test_fallback_conforms_to_schema() {
        let validator = SchemaValidator::for_type::<RfpSummary>().unwrap();
        assert!(validator.conforms(&fallback_summary()).is_ok());
    }

    #[test]
    fn test_empty_summary_fails_check() {
        let blank = RfpSummary { summary: "  ".into() };
        assert!(blank.check().is_err());
    }

    #[test]
    fn test_prompt_includes_document() {
        let prompt = SummaryPrompt {
            rfp_url: "https://example.com/rfp-003".into(),
            document: "Turnkey underground cabling.".into(),
        };
        let t = PromptTemplate::new("t", SUMMARIZE_PROMPT);
        let rendered = t.render(&prompt.bindings()).unwrap();
        assert!(rendered.contains("URL: https://example.com/rfp-003."));
        assert!(rendered.contains("Document:\nTurnkey underground cabling."));
    }
}

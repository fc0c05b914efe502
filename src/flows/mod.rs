//! 分析流程：每个流程 = Prompt 模板 + Structured Generator + 带降级值的 Guarded Call
//!
//! | 流程 | 超时 | 降级值 |
//! |---|---|---|
//! | legal_risks | 5s | 典型风险清单 |
//! | pricing | 4s | 激进策略 -4.5% |
//! | compliance | 8s | Phoenix-A1 / Griffin-C2 矩阵 |
//! | summarize | 15s（含下载） | 「摘要不可用」 |

pub mod compliance;
pub mod fetch;
pub mod legal_risks;
pub mod pricing;
pub mod summarize;

pub use compliance::{
    ComplianceFlow, ComplianceInput, ComplianceMatrix, ComplianceResult, MatchDetail,
    ProductSpec, RequirementSpec,
};
pub use fetch::{DocumentSource, HttpDocumentSource};
pub use legal_risks::{LegalRisk, LegalRiskFlow, LegalRiskInput, LegalRiskReport};
pub use pricing::{BidOutcome, PricingAdjustment, PricingFlow, PricingInput};
pub use summarize::{RfpSummary, SummarizeFlow, SummarizeInput};

/// RFP 链接必须是 http/https 绝对地址
pub(crate) fn validate_rfp_url(url: &str) -> Result<(), String> {
    let parsed = reqwest::Url::parse(url.trim()).map_err(|e| format!("invalid rfpUrl {url:?}: {e}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported rfpUrl scheme: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rfp_url() {
        assert!(validate_rfp_url("https://example.com/rfp-001").is_ok());
        assert!(validate_rfp_url("ftp://example.com/rfp").is_err());
        assert!(validate_rfp_url("not a url").is_err());
    }
}

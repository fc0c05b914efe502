//! 合规矩阵：对比 RFP 技术要求与各产品规格（8 秒预算）

use std::sync::Arc;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::generator::{Bindings, GenerationPlan, PromptInput, PromptTemplate, StructuredGenerator};
use crate::guard::{GuardObserver, GuardSetupError, GuardedCall, GuardedResult};
use crate::schema::OutputSchema;

pub const COMPLIANCE_TIMEOUT: Duration = Duration::from_millis(8000);

const COMPLIANCE_PROMPT: &str = "Compare the RFP requirements against the product specs.

RFP Requirements:
{rfp_requirements}

Products:
{product_specs}

Output a JSON object with:
1. \"complianceMatrix\": Array of objects for each product with \"productName\", \"specMatchPercentage\" (0-100), and \"matchDetails\" (array of objects with \"requirement\", \"rfpValue\", \"productValue\", \"match\" boolean).
2. \"topMatchingProduct\": The object from the matrix with the highest percentage.";

/// 技术参数及其取值（如 Voltage Rating = 1100V）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RequirementSpec {
    pub parameter: String,
    pub value: String,
}

/// 一个产品 SKU 及其规格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSpec {
    pub product_name: String,
    pub specs: Vec<RequirementSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceInput {
    pub rfp_requirements: Vec<RequirementSpec>,
    pub product_specs: Vec<ProductSpec>,
}

impl PromptInput for ComplianceInput {
    fn bindings(&self) -> Bindings {
        let requirements = self
            .rfp_requirements
            .iter()
            .map(|r| format!("- {}: {}", r.parameter, r.value))
            .collect::<Vec<_>>()
            .join("\n");

        let products = self
            .product_specs
            .iter()
            .map(|p| {
                let specs = p
                    .specs
                    .iter()
                    .map(|s| format!("    - {}: {}", s.parameter, s.value))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("- {}:\n{}", p.product_name, specs)
            })
            .collect::<Vec<_>>()
            .join("\n");

        Bindings::from([
            ("rfp_requirements".to_string(), requirements),
            ("product_specs".to_string(), products),
        ])
    }

    fn validate(&self) -> Result<(), String> {
        if self.rfp_requirements.is_empty() {
            return Err("rfpRequirements must not be empty".to_string());
        }
        if self.product_specs.is_empty() {
            return Err("productSpecs must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetail {
    pub requirement: String,
    pub rfp_value: String,
    pub product_value: String,
    #[serde(rename = "match")]
    pub matched: bool,
}

/// 单个产品的合规结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResult {
    pub product_name: String,
    /// 满足的 RFP 要求百分比
    #[schemars(range(min = 0, max = 100))]
    pub spec_match_percentage: f64,
    pub match_details: Vec<MatchDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceMatrix {
    pub top_matching_product: ComplianceResult,
    pub compliance_matrix: Vec<ComplianceResult>,
}

impl OutputSchema for ComplianceMatrix {
    /// 矩阵非空时，最佳产品必须出现在矩阵中
    fn check(&self) -> Result<(), String> {
        let top = &self.top_matching_product.product_name;
        if !self.compliance_matrix.is_empty()
            && !self.compliance_matrix.iter().any(|r| &r.product_name == top)
        {
            return Err(format!("topMatchingProduct {top:?} is not in complianceMatrix"));
        }
        Ok(())
    }
}

fn detail(requirement: &str, rfp_value: &str, product_value: &str) -> MatchDetail {
    MatchDetail {
        requirement: requirement.to_string(),
        rfp_value: rfp_value.to_string(),
        product_value: product_value.to_string(),
        matched: rfp_value == product_value,
    }
}

pub fn fallback_matrix() -> ComplianceMatrix {
    ComplianceMatrix {
        top_matching_product: ComplianceResult {
            product_name: "Phoenix-A1".to_string(),
            spec_match_percentage: 100.0,
            match_details: Vec::new(),
        },
        compliance_matrix: vec![
            ComplianceResult {
                product_name: "Phoenix-A1".to_string(),
                spec_match_percentage: 100.0,
                match_details: vec![
                    detail("Conductor Material", "Copper", "Copper"),
                    detail("Voltage Rating", "1100V", "1100V"),
                    detail("Insulation Material", "XLPE", "XLPE"),
                ],
            },
            ComplianceResult {
                product_name: "Griffin-C2".to_string(),
                spec_match_percentage: 66.0,
                match_details: vec![
                    detail("Conductor Material", "Copper", "Copper"),
                    detail("Voltage Rating", "1100V", "800V"),
                    detail("Insulation Material", "XLPE", "XLPE"),
                ],
            },
        ],
    }
}

/// 合规矩阵流程
pub struct ComplianceFlow {
    generator: Arc<StructuredGenerator>,
    plan: GenerationPlan<ComplianceInput, ComplianceMatrix>,
    guard: GuardedCall<ComplianceMatrix>,
}

impl ComplianceFlow {
    pub fn new(generator: Arc<StructuredGenerator>, timeout: Duration) -> Result<Self, GuardSetupError> {
        Ok(Self {
            generator,
            plan: GenerationPlan::new(PromptTemplate::new(
                "complianceMatrix",
                COMPLIANCE_PROMPT,
            ))
            .map_err(|e| GuardSetupError::schema("compliance", e))?,
            guard: GuardedCall::new("compliance", timeout, fallback_matrix())?,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn GuardObserver>) -> Self {
        self.guard = self.guard.with_observer(observer);
        self
    }

    pub async fn generate(&self, input: &ComplianceInput) -> GuardedResult<ComplianceMatrix> {
        self.guard
            .run(|| self.generator.generate(&self.plan, input))
            .await
    }
}

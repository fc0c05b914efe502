//! 输赢复盘定价调整：根据历史投标结果给出新的定价策略（4 秒预算）

use std::sync::Arc;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::generator::{Bindings, GenerationPlan, PromptInput, PromptTemplate, StructuredGenerator};
use crate::guard::{GuardObserver, GuardSetupError, GuardedCall, GuardedResult};
use crate::schema::OutputSchema;

pub const PRICING_TIMEOUT: Duration = Duration::from_millis(4000);

const PRICING_PROMPT: &str = "Analyze the win/loss data to adjust pricing.

RFP Summary: {rfp_summary}

Past Bids:
{past_bids}

Current Strategy: {current_pricing_strategy}

Output a JSON object exactly like this example:
{
  \"adjustedPricingStrategy\": \"Aggressive\",
  \"suggestedPriceAdjustmentPercentage\": -5,
  \"reasoning\": \"Lost previous bids due to high price.\"
}

Output a JSON object with:
1. \"adjustedPricingStrategy\": New strategy name.
2. \"suggestedPriceAdjustmentPercentage\": Number.
3. \"reasoning\": Brief explanation.";

/// 一次历史投标
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BidOutcome {
    pub bid_price: f64,
    pub win: bool,
    /// 落标原因（仅落标时有）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_for_loss: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingInput {
    pub rfp_summary: String,
    pub past_bid_outcomes: Vec<BidOutcome>,
    /// 当前策略，如 Aggressive / Balanced / Premium
    pub current_pricing_strategy: String,
}

impl PricingInput {
    fn render_past_bids(&self) -> String {
        if self.past_bid_outcomes.is_empty() {
            return "- (no past bids)".to_string();
        }
        self.past_bid_outcomes
            .iter()
            .map(|b| {
                format!(
                    "- Price: {}, Won: {}, Loss Reason: {}",
                    b.bid_price,
                    b.win,
                    b.reason_for_loss.as_deref().unwrap_or("")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl PromptInput for PricingInput {
    fn bindings(&self) -> Bindings {
        Bindings::from([
            ("rfp_summary".to_string(), self.rfp_summary.clone()),
            ("past_bids".to_string(), self.render_past_bids()),
            (
                "current_pricing_strategy".to_string(),
                self.current_pricing_strategy.clone(),
            ),
        ])
    }

    fn validate(&self) -> Result<(), String> {
        if let Some(b) = self
            .past_bid_outcomes
            .iter()
            .find(|b| !b.bid_price.is_finite() || b.bid_price < 0.0)
        {
            return Err(format!("invalid bidPrice: {}", b.bid_price));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingAdjustment {
    pub adjusted_pricing_strategy: String,
    /// 建议调价百分比（负数为降价）
    pub suggested_price_adjustment_percentage: f64,
    pub reasoning: String,
}

impl OutputSchema for PricingAdjustment {
    fn check(&self) -> Result<(), String> {
        if !self.suggested_price_adjustment_percentage.is_finite() {
            return Err("suggestedPriceAdjustmentPercentage must be finite".to_string());
        }
        if self.adjusted_pricing_strategy.trim().is_empty() {
            return Err("adjustedPricingStrategy must not be empty".to_string());
        }
        Ok(())
    }
}

pub fn fallback_adjustment() -> PricingAdjustment {
    PricingAdjustment {
        adjusted_pricing_strategy: "Aggressive (Fallback)".to_string(),
        suggested_price_adjustment_percentage: -4.5,
        reasoning: "AI analysis timed out or failed. Defaulting to aggressive strategy based on recent loss history.".to_string(),
    }
}

/// 定价调整流程
pub struct PricingFlow {
    generator: Arc<StructuredGenerator>,
    plan: GenerationPlan<PricingInput, PricingAdjustment>,
    guard: GuardedCall<PricingAdjustment>,
}

impl PricingFlow {
    pub fn new(generator: Arc<StructuredGenerator>, timeout: Duration) -> Result<Self, GuardSetupError> {
        Ok(Self {
            generator,
            plan: GenerationPlan::new(PromptTemplate::new(
                "adjustPricing",
                PRICING_PROMPT,
            ))
            .map_err(|e| GuardSetupError::schema("pricing", e))?,
            guard: GuardedCall::new("pricing", timeout, fallback_adjustment())?,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn GuardObserver>) -> Self {
        self.guard = self.guard.with_observer(observer);
        self
    }

    pub async fn adjust(&self, input: &PricingInput) -> GuardedResult<PricingAdjustment> {
        self.guard
            .run(|| self.generator.generate(&self.plan, input))
            .await
    }
}

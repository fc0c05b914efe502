//! RFP 领域类型（线上格式与前端一致：camelCase 字段、带空格的状态名）

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// 风险等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

/// RFP 处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum RfpStatus {
    Processing,
    Completed,
    Error,
    #[serde(rename = "Awaiting Review")]
    AwaitingReview,
}

/// 一条 RFP 记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rfp {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub status: RfpStatus,
    pub submission_date: NaiveDate,
    pub client: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
}

impl Rfp {
    /// 刚提交、尚在处理中的占位记录
    pub fn placeholder(id: impl Into<String>, url: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            id: id.into(),
            title: "Processing new RFP...".to_string(),
            summary: "AI is currently processing the document.".to_string(),
            status: RfpStatus::Processing,
            submission_date: today,
            client: "Unknown".to_string(),
            url: url.into(),
            risk_level: None,
        }
    }

    /// 链接中的主机名（标题用）
    pub fn host(&self) -> Option<String> {
        reqwest::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }
}

//! RFP Triage - 结构化 LLM 分析与超时降级
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 生成调用的错误类型
//! - **flows**: 法律风险 / 定价调整 / 合规矩阵 / 摘要 四个分析流程
//! - **generator**: Prompt 模板 + LLM + Output Schema 的结构化生成
//! - **guard**: Guarded Call（超时竞速、降级值、诊断日志）
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Ollama / Mock）
//! - **observability**: tracing 初始化
//! - **pipeline**: 并发分诊与 RFP 录入
//! - **rfp**: RFP 领域类型
//! - **schema**: JSON Schema 生成与校验

pub mod config;
pub mod core;
pub mod flows;
pub mod generator;
pub mod guard;
pub mod llm;
pub mod observability;
pub mod pipeline;
pub mod rfp;
pub mod schema;

#[cfg(test)]
mod test_support;

pub use guard::{GuardedCall, GuardedResponse, GuardedResult};
pub use pipeline::{TriagePipeline, TriageReport, TriageRequest};

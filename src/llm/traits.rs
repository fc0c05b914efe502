//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / Ollama / Mock）实现 LlmClient；Structured Generator 只依赖此 trait，
//! 测试中可用 MockLlmClient 替换真实模型。

use async_trait::async_trait;
use thiserror::Error;

use crate::llm::Message;

/// LLM 调用失败的原因（写入日志时区分子类型，降级策略不区分）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// 模型服务不可达（连接失败、DNS 等）
    #[error("LLM unreachable: {0}")]
    Unreachable(String),

    /// 服务端返回的 API 错误
    #[error("LLM provider error: {0}")]
    Provider(String),

    #[error("LLM returned an empty response")]
    EmptyResponse,

    /// 请求构造失败等本地错误
    #[error("LLM request error: {0}")]
    Request(String),
}

/// LLM 客户端 trait：非流式完成
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成，返回首条回复的文本
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;

    /// 模型名，用于日志
    fn model_name(&self) -> &str;
}

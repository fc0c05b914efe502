//! LLM 层：客户端抽象与实现（OpenAI 兼容 / Ollama / Mock）

pub mod message;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use crate::config::LlmSection;

pub use message::{Message, Role};
pub use mock::{MockBehavior, MockLlmClient};
pub use ollama::{create_ollama_client, OLLAMA_BASE_URL, OLLAMA_LLAMA3_2};
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::{LlmClient, LlmError};

/// 按 [llm] 段创建客户端：ollama（默认）/ openai / mock
///
/// mock 后端对任何请求都返回失败，便于在无模型环境下演示降级路径。
pub fn create_client(section: &LlmSection) -> Result<Arc<dyn LlmClient>, LlmError> {
    match section.provider.as_str() {
        "ollama" => Ok(Arc::new(create_ollama_client(
            section.base_url.as_deref(),
            &section.model,
        ))),
        "openai" => {
            let api_key = std::env::var(&section.api_key_env).ok();
            Ok(Arc::new(OpenAiClient::new(
                section.base_url.as_deref(),
                &section.model,
                api_key.as_deref(),
            )))
        }
        "mock" => Ok(Arc::new(MockLlmClient::failing(LlmError::Unreachable(
            "mock backend has no model".to_string(),
        )))),
        other => Err(LlmError::Request(format!("unknown llm provider: {other}"))),
    }
}

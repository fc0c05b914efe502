//! Ollama 本地模型（OpenAI 兼容格式）
//!
//! Ollama 在 `/v1` 下提供与 OpenAI 兼容的 Chat Completions 接口。
//! - Base URL: http://127.0.0.1:11434/v1
//! - 模型: llama3.2

use crate::llm::OpenAiClient;

/// Ollama 默认常量
pub const OLLAMA_BASE_URL: &str = "http://127.0.0.1:11434/v1";
pub const OLLAMA_LLAMA3_2: &str = "llama3.2";

/// 创建 Ollama 客户端
///
/// - base_url 未指定时优先使用环境变量 `OLLAMA_BASE_URL`，否则为本机默认地址
/// - Ollama 不校验 API Key，传入占位值即可
pub fn create_ollama_client(base_url: Option<&str>, model: &str) -> OpenAiClient {
    let base_url = base_url
        .map(String::from)
        .or_else(|| std::env::var("OLLAMA_BASE_URL").ok())
        .unwrap_or_else(|| OLLAMA_BASE_URL.to_string());

    let model = if model.trim().is_empty() {
        OLLAMA_LLAMA3_2
    } else {
        model
    };

    OpenAiClient::new(Some(&base_url), model, Some("ollama"))
}

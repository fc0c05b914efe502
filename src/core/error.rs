//! 生成调用的错误类型
//!
//! Guarded Call 对所有 GenerationError 一视同仁地降级；kind() 只用于日志区分失败子类型。

use thiserror::Error;

use crate::llm::LlmError;
use crate::schema::SchemaError;

/// Structured Generator 一次调用可能出现的错误（输入、模板、模型、输出解析、下载等）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Prompt template error: {0}")]
    Template(String),

    #[error(transparent)]
    Llm(#[from] LlmError),

    /// 模型回复中找不到可解析的 JSON 对象，或无法反序列化为输出类型
    #[error("Malformed model output: {reason} (output: {preview})")]
    MalformedOutput { reason: String, preview: String },

    /// JSON 结构或领域约束不满足 Output Schema
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("Document fetch failed: {0}")]
    Fetch(String),
}

impl GenerationError {
    /// 失败子类型名，写入结构化日志
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::InvalidInput(_) => "invalid_input",
            GenerationError::Template(_) => "template",
            GenerationError::Llm(_) => "llm",
            GenerationError::MalformedOutput { .. } => "malformed_output",
            GenerationError::SchemaViolation(_) => "schema_violation",
            GenerationError::Fetch(_) => "fetch",
        }
    }

    /// 构造 MalformedOutput，模型原文只保留前 200 字符
    pub fn malformed(reason: impl Into<String>, raw: &str) -> Self {
        GenerationError::MalformedOutput {
            reason: reason.into(),
            preview: preview(raw),
        }
    }
}

impl From<SchemaError> for GenerationError {
    fn from(err: SchemaError) -> Self {
        GenerationError::SchemaViolation(err.to_string())
    }
}

fn preview(raw: &str) -> String {
    if raw.chars().count() > 200 {
        format!("{}...", raw.chars().take(200).collect::<String>())
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_distinguishes_failures() {
        assert_eq!(
            GenerationError::from(LlmError::EmptyResponse).kind(),
            "llm"
        );
        assert_eq!(GenerationError::Fetch("HTTP 404".into()).kind(), "fetch");
        assert_eq!(GenerationError::malformed("no json", "hello").kind(), "malformed_output");
    }

    #[test]
    fn test_malformed_truncates_preview() {
        let raw = "x".repeat(500);
        match GenerationError::malformed("no json", &raw) {
            GenerationError::MalformedOutput { preview, .. } => {
                assert_eq!(preview.chars().count(), 203);
                assert!(preview.ends_with("..."));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_llm_error_is_transparent() {
        let err = GenerationError::from(LlmError::Unreachable("connection refused".into()));
        assert_eq!(err.to_string(), "LLM unreachable: connection refused");
    }
}

//! Guarded Call 的结果

use std::time::Duration;

use serde::Serialize;

use crate::core::GenerationError;

/// 使用降级值的原因
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackCause {
    /// 操作在预算内未完成
    Timeout { budget: Duration },
    /// 操作在超时前失败
    OperationError(GenerationError),
}

impl FallbackCause {
    pub fn kind(&self) -> &'static str {
        match self {
            FallbackCause::Timeout { .. } => "timeout",
            FallbackCause::OperationError(_) => "operation_error",
        }
    }
}

impl std::fmt::Display for FallbackCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackCause::Timeout { budget } => {
                write!(f, "timed out after {}ms", budget.as_millis())
            }
            FallbackCause::OperationError(err) => write!(f, "{err}"),
        }
    }
}

/// 一次 Guarded Call 的结果：两种变体暴露同样形状的 value，调用方无需分支
#[derive(Debug, Clone, PartialEq)]
pub enum GuardedResult<T> {
    Success(T),
    FallbackUsed { value: T, cause: FallbackCause },
}

impl<T> GuardedResult<T> {
    pub fn value(&self) -> &T {
        match self {
            GuardedResult::Success(value) => value,
            GuardedResult::FallbackUsed { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            GuardedResult::Success(value) => value,
            GuardedResult::FallbackUsed { value, .. } => value,
        }
    }

    /// 是否为降级结果（仅用于诊断 / 「近似结果」提示）
    pub fn is_degraded(&self) -> bool {
        matches!(self, GuardedResult::FallbackUsed { .. })
    }

    pub fn cause(&self) -> Option<&FallbackCause> {
        match self {
            GuardedResult::Success(_) => None,
            GuardedResult::FallbackUsed { cause, .. } => Some(cause),
        }
    }

    /// 转为可序列化的响应（CLI / HTTP 输出）
    pub fn into_response(self) -> GuardedResponse<T> {
        let (degraded, cause) = match &self {
            GuardedResult::Success(_) => (false, None),
            GuardedResult::FallbackUsed { cause, .. } => (true, Some(cause.to_string())),
        };
        GuardedResponse {
            value: self.into_value(),
            degraded,
            cause,
        }
    }
}

/// GuardedResult 的线上形态：`{ "value": ..., "degraded": bool, "cause"?: string }`
#[derive(Debug, Clone, Serialize)]
pub struct GuardedResponse<T> {
    pub value: T,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;

    #[test]
    fn test_both_variants_expose_value() {
        let ok: GuardedResult<u32> = GuardedResult::Success(1);
        let degraded = GuardedResult::FallbackUsed {
            value: 2,
            cause: FallbackCause::Timeout { budget: Duration::from_millis(4000) },
        };
        assert_eq!(*ok.value(), 1);
        assert_eq!(*degraded.value(), 2);
        assert!(!ok.is_degraded());
        assert!(degraded.is_degraded());
        assert_eq!(degraded.cause().map(FallbackCause::kind), Some("timeout"));
    }

    #[test]
    fn test_response_serialization() {
        let ok = serde_json::to_value(GuardedResult::Success(7).into_response()).unwrap();
        assert_eq!(ok, serde_json::json!({"value": 7, "degraded": false}));

        let failed = GuardedResult::FallbackUsed {
            value: 0,
            cause: FallbackCause::OperationError(GenerationError::Llm(LlmError::EmptyResponse)),
        };
        let json = serde_json::to_value(failed.into_response()).unwrap();
        assert_eq!(json["degraded"], true);
        assert_eq!(json["cause"], "LLM returned an empty response");
    }

    #[test]
    fn test_timeout_cause_display() {
        let cause = FallbackCause::Timeout { budget: Duration::from_millis(5000) };
        assert_eq!(cause.to_string(), "timed out after 5000ms");
    }
}

//! 注入式结构化日志
//!
//! Guarded Call 不直接打印；降级原因通过 GuardObserver 上报。默认 TracingObserver 写 tracing 事件，
//! RecordingObserver 在内存中记录事件，测试无需捕获标准输出。

use std::sync::Mutex;
use std::time::Duration;

use crate::guard::FallbackCause;

/// 一次调用的结局
#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    Success,
    Fallback(FallbackCause),
}

/// 一条诊断事件
#[derive(Debug, Clone, PartialEq)]
pub struct GuardEvent {
    pub label: String,
    pub outcome: GuardOutcome,
    pub elapsed: Duration,
}

/// 降级观察者：每次调用恰好收到一次回调
pub trait GuardObserver: Send + Sync {
    /// 成功不是错误，默认不记录
    fn on_success(&self, _label: &str, _elapsed: Duration) {}

    fn on_fallback(&self, label: &str, cause: &FallbackCause, elapsed: Duration);
}

/// 默认观察者：超时记 WARN，操作失败记 ERROR 并附失败子类型
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl GuardObserver for TracingObserver {
    fn on_success(&self, label: &str, elapsed: Duration) {
        tracing::debug!(
            flow = label,
            elapsed_ms = elapsed.as_millis() as u64,
            "guarded call succeeded"
        );
    }

    fn on_fallback(&self, label: &str, cause: &FallbackCause, elapsed: Duration) {
        let elapsed_ms = elapsed.as_millis() as u64;
        match cause {
            FallbackCause::Timeout { budget } => tracing::warn!(
                flow = label,
                budget_ms = budget.as_millis() as u64,
                elapsed_ms,
                "guarded call timed out, using fallback"
            ),
            FallbackCause::OperationError(err) => tracing::error!(
                flow = label,
                kind = err.kind(),
                error = %err,
                elapsed_ms,
                "guarded call failed, using fallback"
            ),
        }
    }
}

/// 内存记录观察者（测试与诊断）
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<GuardEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<GuardEvent> {
        self.lock().clone()
    }

    /// 已记录的降级原因
    pub fn fallbacks(&self) -> Vec<FallbackCause> {
        self.lock()
            .iter()
            .filter_map(|e| match &e.outcome {
                GuardOutcome::Fallback(cause) => Some(cause.clone()),
                GuardOutcome::Success => None,
            })
            .collect()
    }

    fn push(&self, event: GuardEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<GuardEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl GuardObserver for RecordingObserver {
    fn on_success(&self, label: &str, elapsed: Duration) {
        self.push(GuardEvent {
            label: label.to_string(),
            outcome: GuardOutcome::Success,
            elapsed,
        });
    }

    fn on_fallback(&self, label: &str, cause: &FallbackCause, elapsed: Duration) {
        self.push(GuardEvent {
            label: label.to_string(),
            outcome: GuardOutcome::Fallback(cause.clone()),
            elapsed,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GenerationError;

    #[test]
    fn test_recording_observer_keeps_order() {
        let obs = RecordingObserver::new();
        obs.on_success("pricing", Duration::from_millis(10));
        obs.on_fallback(
            "legal_risks",
            &FallbackCause::OperationError(GenerationError::Fetch("HTTP 500".into())),
            Duration::from_millis(20),
        );

        let events = obs.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].label, "pricing");
        assert_eq!(events[0].outcome, GuardOutcome::Success);
        assert_eq!(obs.fallbacks().len(), 1);
        assert_eq!(obs.fallbacks()[0].kind(), "operation_error");
    }
}

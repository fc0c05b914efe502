//! 竞速原语：操作 vs 计时器
//!
//! `tokio::time::timeout` 先轮询操作再检查计时器，同一时刻就绪时操作成功优先。
//! 计时器先到时操作 future 被丢弃，迟到的结果不会被调用方观察到；每次调用都是全新的竞速，
//! 没有跨调用共享的结果槽。不重试。

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::core::GenerationError;
use crate::guard::{FallbackCause, GuardObserver, GuardedResult};

/// 在 `budget` 内运行 `operation`；超时或失败时返回 `fallback`，并恰好上报一次
pub async fn race_with_fallback<T, F, Fut>(
    label: &str,
    operation: F,
    budget: Duration,
    fallback: T,
    observer: &dyn GuardObserver,
) -> GuardedResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, GenerationError>>,
{
    let start = Instant::now();
    let cause = match tokio::time::timeout(budget, operation()).await {
        Ok(Ok(value)) => {
            observer.on_success(label, start.elapsed());
            return GuardedResult::Success(value);
        }
        Ok(Err(err)) => FallbackCause::OperationError(err),
        Err(_) => FallbackCause::Timeout { budget },
    };

    observer.on_fallback(label, &cause, start.elapsed());
    GuardedResult::FallbackUsed {
        value: fallback,
        cause,
    }
}

//! 带名字的 Guarded Call 调用点
//!
//! 构造时完成所有可能失败的检查（超时为正、降级值满足 Output Schema），因此 `run` 是全函数：
//! 总是在预算内返回一个满足 Schema 的值。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::core::GenerationError;
use crate::guard::{race_with_fallback, GuardObserver, GuardedResult, TracingObserver};
use crate::schema::{OutputSchema, SchemaError, SchemaValidator};

/// 调用点配置错误（启动期暴露，运行期不可能出现）
#[derive(Error, Debug)]
pub enum GuardSetupError {
    #[error("{label}: timeout must be positive")]
    ZeroTimeout { label: String },

    #[error("{label}: fallback value rejected: {source}")]
    FallbackRejected {
        label: String,
        #[source]
        source: SchemaError,
    },

    #[error("{label}: {source}")]
    Schema {
        label: String,
        #[source]
        source: SchemaError,
    },
}

impl GuardSetupError {
    /// 流程的输入/输出 Schema 无法编译
    pub fn schema(label: impl Into<String>, source: SchemaError) -> Self {
        Self::Schema {
            label: label.into(),
            source,
        }
    }
}

/// Guarded Call：固定超时预算 + 预先构造的降级值 + 注入的观察者
pub struct GuardedCall<T: OutputSchema> {
    label: String,
    timeout: Duration,
    fallback: T,
    validator: SchemaValidator,
    observer: Arc<dyn GuardObserver>,
}

impl<T: OutputSchema> std::fmt::Debug for GuardedCall<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedCall")
            .field("label", &self.label)
            .field("timeout", &self.timeout)
            .field("schema", &self.validator.name())
            .finish_non_exhaustive()
    }
}

impl<T: OutputSchema> GuardedCall<T> {
    pub fn new(
        label: impl Into<String>,
        timeout: Duration,
        fallback: T,
    ) -> Result<Self, GuardSetupError> {
        let label = label.into();
        if timeout.is_zero() {
            return Err(GuardSetupError::ZeroTimeout { label });
        }
        let validator = match SchemaValidator::for_type::<T>() {
            Ok(v) => v,
            Err(source) => return Err(GuardSetupError::Schema { label, source }),
        };
        if let Err(source) = validator.conforms(&fallback) {
            return Err(GuardSetupError::FallbackRejected { label, source });
        }

        Ok(Self {
            label,
            timeout,
            fallback,
            validator,
            observer: Arc::new(TracingObserver),
        })
    }

    /// 替换观察者（默认 TracingObserver）
    pub fn with_observer(mut self, observer: Arc<dyn GuardObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn fallback(&self) -> &T {
        &self.fallback
    }

    /// 运行一次：单次尝试，不重试；成功值不满足 Schema 时按操作失败处理
    pub async fn run<F, Fut>(&self, operation: F) -> GuardedResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        let span = tracing::info_span!(
            "guarded_call",
            flow = %self.label,
            call_id = %Uuid::new_v4(),
        );

        let validated = || async move {
            let value = operation().await?;
            self.validator.conforms(&value)?;
            Ok::<T, GenerationError>(value)
        };

        race_with_fallback(
            &self.label,
            validated,
            self.timeout,
            self.fallback.clone(),
            self.observer.as_ref(),
        )
        .instrument(span)
        .await
    }
}

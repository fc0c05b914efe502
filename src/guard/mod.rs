//! Guarded Call：超时 + 降级值 + 诊断日志
//!
//! - **race**: 原始竞速原语，操作与计时器先到先得
//! - **call**: 带名字的调用点；构造时校验降级值与超时，运行时校验成功结果的 Schema
//! - **result**: GuardedResult（Success / FallbackUsed）及可序列化的 GuardedResponse
//! - **observer**: 注入式结构化日志（tracing / 内存记录）

pub mod call;
pub mod observer;
pub mod race;
pub mod result;

pub use call::{GuardSetupError, GuardedCall};
pub use observer::{GuardEvent, GuardObserver, GuardOutcome, RecordingObserver, TracingObserver};
pub use race::race_with_fallback;
pub use result::{FallbackCause, GuardedResponse, GuardedResult};

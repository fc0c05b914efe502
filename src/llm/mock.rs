//! Mock LLM 客户端（用于测试与离线演示，无需 API）
//!
//! 行为可编排：固定回复、按关键词路由回复、固定失败、永不返回；可附加延迟以模拟慢模型。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError, Message, Role};

/// Mock 的回复方式
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// 总是返回同一段文本
    Respond(String),
    /// 取最后一条 User 消息，返回第一个关键词命中的回复；都不命中时返回 EmptyResponse
    Routed(Vec<(String, String)>),
    /// 总是失败
    Fail(LlmError),
    /// 永不返回（模拟挂起的模型）
    Hang,
}

/// Mock 客户端：按 MockBehavior 回复，并记录调用次数
#[derive(Debug)]
pub struct MockLlmClient {
    behavior: MockBehavior,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockLlmClient {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn responding(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::Respond(text.into()))
    }

    pub fn routed(routes: Vec<(String, String)>) -> Self {
        Self::new(MockBehavior::Routed(routes))
    }

    pub fn failing(err: LlmError) -> Self {
        Self::new(MockBehavior::Fail(err))
    }

    pub fn hanging() -> Self {
        Self::new(MockBehavior::Hang)
    }

    /// 每次回复前等待 delay（tokio 时间，测试中可暂停推进）
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.behavior {
            MockBehavior::Respond(text) => Ok(text.clone()),
            MockBehavior::Routed(routes) => {
                let last_user = messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::User)
                    .map(|m| m.content.as_str())
                    .unwrap_or("");
                routes
                    .iter()
                    .find(|(keyword, _)| last_user.contains(keyword.as_str()))
                    .map(|(_, reply)| reply.clone())
                    .ok_or(LlmError::EmptyResponse)
            }
            MockBehavior::Fail(err) => Err(err.clone()),
            MockBehavior::Hang => std::future::pending().await,
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

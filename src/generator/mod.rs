//! Structured Generator：Prompt 模板 + LLM + Output Schema → 类型化结果
//!
//! 这是被 Guarded Call 包裹的外部能力：延迟无上界、可能失败。

pub mod extract;
pub mod structured;
pub mod template;

pub use extract::extract_json;
pub use structured::{GenerationPlan, StructuredGenerator};
pub use template::{Bindings, PromptInput, PromptTemplate};

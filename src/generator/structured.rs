//! Structured Generator：渲染模板、调用 LLM、提取并校验 JSON、反序列化为输出类型
//!
//! 输入与输出都按 JSON Schema 校验；任一步失败都以 GenerationError 返回，由 Guarded Call 统一降级。
//! Schema 在 GenerationPlan 构建时编译一次，生成调用只做校验。

use std::marker::PhantomData;
use std::sync::Arc;

use crate::core::GenerationError;
use crate::generator::{extract_json, PromptInput, PromptTemplate};
use crate::llm::{LlmClient, Message};
use crate::schema::{schema_json, OutputSchema, SchemaError, SchemaValidator};

/// 一个流程的生成方案：模板 + 预编译的输入/输出 Schema + system prompt
pub struct GenerationPlan<I, O> {
    template: PromptTemplate,
    input_schema: SchemaValidator,
    output_schema: SchemaValidator,
    instructions: String,
    _io: PhantomData<fn(&I) -> O>,
}

impl<I, O> std::fmt::Debug for GenerationPlan<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationPlan")
            .field("template", &self.template.name())
            .field("input", &self.input_schema.name())
            .field("output", &self.output_schema.name())
            .finish_non_exhaustive()
    }
}

impl<I: PromptInput, O: OutputSchema> GenerationPlan<I, O> {
    pub fn new(template: PromptTemplate) -> Result<Self, SchemaError> {
        Ok(Self {
            template,
            input_schema: SchemaValidator::for_type::<I>()?,
            output_schema: SchemaValidator::for_type::<O>()?,
            instructions: output_instructions::<O>(),
            _io: PhantomData,
        })
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    fn validate_input(&self, input: &I) -> Result<(), GenerationError> {
        let value = serde_json::to_value(input)
            .map_err(|e| GenerationError::InvalidInput(e.to_string()))?;
        self.input_schema
            .validate(&value)
            .map_err(|e| GenerationError::InvalidInput(e.to_string()))?;
        input.validate().map_err(GenerationError::InvalidInput)
    }
}

/// 结构化生成器：持有 LLM 客户端（显式注入，测试中可替换为 Mock）
pub struct StructuredGenerator {
    llm: Arc<dyn LlmClient>,
}

impl StructuredGenerator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// 一次生成：输入校验 → 模板渲染 → LLM → JSON 提取 → Schema 校验 → 反序列化 → 领域约束
    pub async fn generate<I, O>(
        &self,
        plan: &GenerationPlan<I, O>,
        input: &I,
    ) -> Result<O, GenerationError>
    where
        I: PromptInput,
        O: OutputSchema,
    {
        plan.validate_input(input)?;
        let prompt = plan.template.render(&input.bindings())?;

        let messages = vec![
            Message::system(plan.instructions.clone()),
            Message::user(prompt),
        ];
        tracing::debug!(
            template = plan.template.name(),
            model = self.llm.model_name(),
            "structured generation request"
        );
        let raw = self.llm.complete(&messages).await?;

        let value = extract_json(&raw)?;
        plan.output_schema.validate(&value)?;
        let output: O = serde_json::from_value(value)
            .map_err(|e| GenerationError::malformed(e.to_string(), &raw))?;
        output.check().map_err(GenerationError::SchemaViolation)?;
        Ok(output)
    }
}

/// System prompt：要求只输出一个符合 Schema 的 JSON 对象
fn output_instructions<O: OutputSchema>() -> String {
    format!(
        "You are an RFP analysis assistant. Respond with exactly one JSON object and nothing else \
         (no Markdown, no explanations). The object must conform to this JSON Schema:\n{}",
        schema_json::<O>()
    )
}

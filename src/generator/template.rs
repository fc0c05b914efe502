//! Prompt 模板：`{name}` 占位符 + 绑定变量
//!
//! 占位符只匹配 `{标识符}`，因此模板中的 JSON 示例（`{ "key": ... }`）原样保留。
//! 列表类输入由各 flow 先渲染成文本再绑定。

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::Serialize;

use crate::core::GenerationError;

/// 绑定变量：占位符名 → 文本
pub type Bindings = BTreeMap<String, String>;

/// 可作为 Prompt 输入的请求类型
pub trait PromptInput: Serialize + JsonSchema + Send + Sync {
    /// 模板绑定变量
    fn bindings(&self) -> Bindings;

    /// Schema 之外的输入校验（如 URL 合法性）
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

const PLACEHOLDER_PATTERN: &str = r"\{([A-Za-z_][A-Za-z0-9_]*)\}";

fn placeholder_regex() -> Result<&'static Regex, GenerationError> {
    static RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN))
        .as_ref()
        .map_err(|e| GenerationError::Template(format!("placeholder pattern: {e}")))
}

/// 带命名的 Prompt 模板
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    name: String,
    template: String,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 模板中出现的占位符（去重，按出现顺序）
    pub fn placeholders(&self) -> Result<Vec<String>, GenerationError> {
        let mut names: Vec<String> = Vec::new();
        for cap in placeholder_regex()?.captures_iter(&self.template) {
            let name = cap[1].to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// 渲染：所有占位符都必须有绑定，否则返回 Template 错误；多余的绑定忽略
    pub fn render(&self, bindings: &Bindings) -> Result<String, GenerationError> {
        let missing: Vec<String> = self
            .placeholders()?
            .into_iter()
            .filter(|name| !bindings.contains_key(name))
            .collect();
        if !missing.is_empty() {
            return Err(GenerationError::Template(format!(
                "{}: unbound placeholder(s) {}",
                self.name,
                missing.join(", ")
            )));
        }

        let rendered = placeholder_regex()?.replace_all(&self.template, |cap: &regex::Captures| {
            bindings.get(&cap[1]).cloned().unwrap_or_default()
        });
        Ok(rendered.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(pairs: &[(&str, &str)]) -> Bindings {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_replaces_all_occurrences() {
        let t = PromptTemplate::new("t", "URL: {rfp_url}\nAgain: {rfp_url}");
        let out = t.render(&bind(&[("rfp_url", "https://a.example/rfp")])).unwrap();
        assert_eq!(out, "URL: https://a.example/rfp\nAgain: https://a.example/rfp");
    }

    #[test]
    fn test_json_example_is_not_a_placeholder() {
        let t = PromptTemplate::new(
            "t",
            "Strategy: {strategy}\n{\n  \"adjustedPricingStrategy\": \"Aggressive\"\n}",
        );
        assert_eq!(t.placeholders().unwrap(), vec!["strategy".to_string()]);
        let out = t.render(&bind(&[("strategy", "Balanced")])).unwrap();
        assert!(out.contains("\"adjustedPricingStrategy\": \"Aggressive\""));
    }

    #[test]
    fn test_placeholder_pattern_compiles() {
        assert!(placeholder_regex().is_ok());
        let t = PromptTemplate::new("t", "{b} {a} {b}");
        assert_eq!(t.placeholders().unwrap(), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_unbound_placeholder_is_error() {
        let t = PromptTemplate::new("pricing", "{a} and {b}");
        let err = t.render(&bind(&[("a", "1")])).unwrap_err();
        assert_eq!(err.kind(), "template");
        assert!(err.to_string().contains("pricing: unbound placeholder(s) b"));
    }

    #[test]
    fn test_bound_values_are_not_rescanned() {
        let t = PromptTemplate::new("t", "{a}");
        let out = t.render(&bind(&[("a", "{b}")])).unwrap();
        assert_eq!(out, "{b}");
    }
}

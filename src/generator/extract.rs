//! 从模型回复中提取 JSON 对象
//!
//! 本地模型常在 JSON 外包裹 ```json 代码块或前后说明文字；依次尝试：整体解析、代码块内容、
//! 从每个 `{` 起的流式解析（取第一个完整对象）。

use serde_json::Value;

use crate::core::GenerationError;

pub fn extract_json(raw: &str) -> Result<Value, GenerationError> {
    let trimmed = raw.trim().trim_start_matches('\u{FEFF}');
    if trimmed.is_empty() {
        return Err(GenerationError::malformed("empty output", raw));
    }

    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    if let Some(block) = fenced_block(trimmed) {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(block.trim()) {
            return Ok(value);
        }
    }

    for (idx, _) in trimmed.match_indices('{') {
        let mut stream = serde_json::Deserializer::from_str(&trimmed[idx..]).into_iter::<Value>();
        if let Some(Ok(value @ Value::Object(_))) = stream.next() {
            return Ok(value);
        }
    }

    Err(GenerationError::malformed("no JSON object found", raw))
}

/// ``` 或 ```json 代码块的内容
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after[body_start..];
    let end = body.find("```")?;
    Some(&body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_object() {
        let v = extract_json(r#"{"summary": "ok"}"#).unwrap();
        assert_eq!(v, json!({"summary": "ok"}));
    }

    #[test]
    fn test_fenced_block_with_prose() {
        let raw = "Here is the analysis:\n```json\n{\"summary\": \"ok\", \"legalRisks\": []}\n```\nLet me know.";
        let v = extract_json(raw).unwrap();
        assert_eq!(v["summary"], "ok");
    }

    #[test]
    fn test_object_embedded_in_text() {
        let raw = "Sure! {\"reasoning\": \"price {high}\", \"n\": -5} trailing";
        let v = extract_json(raw).unwrap();
        assert_eq!(v["n"], json!(-5));
        assert_eq!(v["reasoning"], "price {high}");
    }

    #[test]
    fn test_no_object_is_malformed() {
        let err = extract_json("I cannot help with that.").unwrap_err();
        assert_eq!(err.kind(), "malformed_output");
        assert_eq!(extract_json("   ").unwrap_err().kind(), "malformed_output");
        // 顶层数组不是对象
        assert!(extract_json("[1, 2]").is_err());
    }
}

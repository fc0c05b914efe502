//! JSON Schema 生成与校验
//!
//! schemars 生成 draft-07 Schema；编译一次后可重复校验。数值类型上的 `format`
//! （double / uint8 等）是 schemars 的扩展，不属于 JSON Schema 标准格式，编译前移除。

use jsonschema::JSONSchema;
use schemars::{schema_for, JsonSchema};
use serde_json::Value;
use thiserror::Error;

use crate::schema::OutputSchema;

/// Schema 编译或校验失败
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("schema for {schema} failed to compile: {reason}")]
    Compile { schema: String, reason: String },

    #[error("value does not match {schema}: {}", .errors.join("; "))]
    Violation { schema: String, errors: Vec<String> },

    #[error("{schema} constraint failed: {reason}")]
    Constraint { schema: String, reason: String },

    #[error("value of {schema} cannot be serialized: {reason}")]
    Serialize { schema: String, reason: String },
}

const SCHEMARS_NUMBER_FORMATS: &[&str] = &[
    "double", "float", "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16",
    "uint32", "uint64",
];

/// 类型 T 的 JSON Schema（serde_json::Value）
pub fn schema_value<T: JsonSchema>() -> Value {
    let schema = schema_for!(T);
    let mut value = serde_json::to_value(&schema).unwrap_or(Value::Null);
    strip_number_formats(&mut value);
    value
}

/// 类型 T 的 JSON Schema 字符串，可拼入 system prompt
pub fn schema_json<T: JsonSchema>() -> String {
    serde_json::to_string_pretty(&schema_value::<T>()).unwrap_or_else(|_| String::new())
}

fn strip_number_formats(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let numeric_format = map
                .get("format")
                .and_then(Value::as_str)
                .is_some_and(|f| SCHEMARS_NUMBER_FORMATS.contains(&f));
            if numeric_format {
                map.remove("format");
            }
            for child in map.values_mut() {
                strip_number_formats(child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(strip_number_formats),
        _ => {}
    }
}

/// 编译好的 Schema 校验器
pub struct SchemaValidator {
    name: String,
    compiled: JSONSchema,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// 为类型 T 生成并编译 Schema
    pub fn for_type<T: JsonSchema>() -> Result<Self, SchemaError> {
        let name = T::schema_name();
        let schema = schema_value::<T>();
        let compiled = JSONSchema::compile(&schema).map_err(|e| SchemaError::Compile {
            schema: name.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { name, compiled })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 校验任意 JSON 实例；返回全部错误（带实例路径）
    pub fn validate(&self, instance: &Value) -> Result<(), SchemaError> {
        if let Err(errors) = self.compiled.validate(instance) {
            let errors = errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("{path}: {e}")
                    }
                })
                .collect();
            return Err(SchemaError::Violation {
                schema: self.name.clone(),
                errors,
            });
        }
        Ok(())
    }

    /// 校验一个类型化的值：序列化后按 Schema 校验，再执行领域约束
    pub fn conforms<T: OutputSchema>(&self, value: &T) -> Result<(), SchemaError> {
        let json = serde_json::to_value(value).map_err(|e| SchemaError::Serialize {
            schema: self.name.clone(),
            reason: e.to_string(),
        })?;
        self.validate(&json)?;
        value.check().map_err(|reason| SchemaError::Constraint {
            schema: self.name.clone(),
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    struct Score {
        label: String,
        #[schemars(range(min = 0, max = 100))]
        match_percentage: f64,
    }

    impl OutputSchema for Score {
        fn check(&self) -> Result<(), String> {
            if self.label.is_empty() {
                return Err("label must not be empty".to_string());
            }
            Ok(())
        }
    }

    #[test]
    fn test_schema_uses_wire_names_without_number_format() {
        let schema = schema_value::<Score>();
        let props = &schema["properties"];
        assert!(props.get("matchPercentage").is_some());
        assert!(props["matchPercentage"].get("format").is_none());
        assert_eq!(props["matchPercentage"]["maximum"], json!(100.0));
    }

    #[test]
    fn test_validate_reports_path() {
        let validator = SchemaValidator::for_type::<Score>().unwrap();
        assert!(validator
            .validate(&json!({"label": "a", "matchPercentage": 50}))
            .is_ok());

        let err = validator
            .validate(&json!({"label": "a", "matchPercentage": 150}))
            .unwrap_err();
        assert!(err.to_string().contains("/matchPercentage"), "{err}");

        let missing = validator.validate(&json!({"label": "a"})).unwrap_err();
        assert!(matches!(missing, SchemaError::Violation { .. }));
    }

    #[test]
    fn test_conforms_runs_domain_check() {
        let validator = SchemaValidator::for_type::<Score>().unwrap();
        let ok = Score { label: "a".into(), match_percentage: 10.0 };
        assert!(validator.conforms(&ok).is_ok());

        let bad = Score { label: String::new(), match_percentage: 10.0 };
        assert!(matches!(
            validator.conforms(&bad),
            Err(SchemaError::Constraint { .. })
        ));
    }
}

//! Output Schema：由 Rust 类型派生 JSON Schema（schemars），并用 jsonschema 校验实例
//!
//! 成功结果与降级值都必须满足同一个 Output Schema。

pub mod validator;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use validator::{schema_json, schema_value, SchemaError, SchemaValidator};

/// 可作为 Guarded Call 输出的类型
///
/// JSON Schema 由 `JsonSchema` 派生；`check` 用于表达 Schema 之外的领域约束（默认无）。
pub trait OutputSchema:
    JsonSchema + Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

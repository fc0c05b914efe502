//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `RFP__*` 覆盖（双下划线表示嵌套，如 `RFP__LLM__PROVIDER=mock`）。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub flows: FlowsSection,
    #[serde(default)]
    pub fetch: FetchSection,
    #[serde(default)]
    pub web: WebSection,
}

/// [app] 段
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [llm] 段：后端选择（ollama / openai / mock）
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    /// 读取 API Key 的环境变量名
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_provider() -> String {
    "ollama".to_string()
}

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// [flows] 段：每个调用点的超时预算（毫秒）
#[derive(Debug, Clone, Deserialize)]
pub struct FlowsSection {
    #[serde(default = "default_legal_risk_timeout_ms")]
    pub legal_risk_timeout_ms: u64,
    #[serde(default = "default_pricing_timeout_ms")]
    pub pricing_timeout_ms: u64,
    #[serde(default = "default_compliance_timeout_ms")]
    pub compliance_timeout_ms: u64,
    /// 含文档下载时间
    #[serde(default = "default_summarize_timeout_ms")]
    pub summarize_timeout_ms: u64,
}

impl Default for FlowsSection {
    fn default() -> Self {
        Self {
            legal_risk_timeout_ms: default_legal_risk_timeout_ms(),
            pricing_timeout_ms: default_pricing_timeout_ms(),
            compliance_timeout_ms: default_compliance_timeout_ms(),
            summarize_timeout_ms: default_summarize_timeout_ms(),
        }
    }
}

impl FlowsSection {
    pub fn legal_risk_timeout(&self) -> Duration {
        Duration::from_millis(self.legal_risk_timeout_ms)
    }

    pub fn pricing_timeout(&self) -> Duration {
        Duration::from_millis(self.pricing_timeout_ms)
    }

    pub fn compliance_timeout(&self) -> Duration {
        Duration::from_millis(self.compliance_timeout_ms)
    }

    pub fn summarize_timeout(&self) -> Duration {
        Duration::from_millis(self.summarize_timeout_ms)
    }
}

fn default_legal_risk_timeout_ms() -> u64 {
    5000
}

fn default_pricing_timeout_ms() -> u64 {
    4000
}

fn default_compliance_timeout_ms() -> u64 {
    8000
}

fn default_summarize_timeout_ms() -> u64 {
    15000
}

/// [fetch] 段：下载 RFP 文档的超时、最大字符数与响应体字节上限
#[derive(Debug, Clone, Deserialize)]
pub struct FetchSection {
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_result_chars")]
    pub max_result_chars: usize,
    /// 超过此字节数的响应体不再读取
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout_secs(),
            max_result_chars: default_max_result_chars(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_max_result_chars() -> usize {
    8000
}

fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}

/// [web] 段：HTTP 接口监听地址
#[derive(Debug, Clone, Deserialize)]
pub struct WebSection {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

/// 从 config 目录加载配置，环境变量 RFP__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 RFP__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("RFP")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_call_site_budgets() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.flows.pricing_timeout(), Duration::from_millis(4000));
        assert_eq!(cfg.flows.legal_risk_timeout(), Duration::from_millis(5000));
        assert_eq!(cfg.flows.compliance_timeout(), Duration::from_millis(8000));
        assert_eq!(cfg.llm.provider, "ollama");
        assert_eq!(cfg.llm.model, "llama3.2");
    }

    #[test]
    fn test_load_config_file_overrides() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "[llm]\nprovider = \"mock\"\n\n[flows]\npricing_timeout_ms = 1500\n"
        )
        .unwrap();

        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.llm.provider, "mock");
        assert_eq!(cfg.flows.pricing_timeout_ms, 1500);
        // 未覆盖的键保持默认
        assert_eq!(cfg.flows.compliance_timeout_ms, 8000);
        assert_eq!(cfg.fetch.max_result_chars, 8000);
        assert_eq!(cfg.fetch.max_body_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn test_missing_explicit_file_is_ignored() {
        let cfg = load_config(Some(PathBuf::from("/nonexistent/rfp-triage.toml"))).unwrap();
        assert_eq!(cfg.web.bind, "127.0.0.1:8080");
    }
}

//! RFP 文档下载：超时、结果大小限制、HTML 转文本
//!
//! GET 请求带超时与 User-Agent；响应体分块读取，超过 max_body_bytes 的部分不再读取；
//! 文本超过 max_result_chars 时截断并追加 ...[truncated]。
//! 对 HTML 响应使用 html2text 提取可读文本，去除标签与脚本。

use std::time::Duration;

use async_trait::async_trait;
use html2text::from_read;
use reqwest::Client;

use crate::config::FetchSection;
use crate::core::GenerationError;

/// 文档来源：按 URL 取回文本内容（测试中可替换为内存实现）
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, GenerationError>;
}

/// 简易去除 HTML 标签（html2text 失败时的回退）
fn strip_html_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 判断内容是否像 HTML（需提取可读文本）
fn looks_like_html(s: &str) -> bool {
    let s = s.trim_start();
    s.starts_with("<!")
        || s.starts_with("<html")
        || s.starts_with("<HTML")
        || (s.len() > 20
            && s.contains('<')
            && (s.contains("</") || s.contains("<meta") || s.contains("<head") || s.contains("<title")))
}

fn html_to_text(html: &str) -> String {
    match from_read(html.as_bytes(), 120) {
        Ok(text) if !text.trim().is_empty() => text,
        _ => strip_html_tags(html),
    }
}

/// 去 BOM、HTML 转文本、按字符数截断
fn normalize_body(body: String, max_chars: usize) -> String {
    let body = match body.strip_prefix('\u{FEFF}') {
        Some(rest) => rest.to_string(),
        None => body,
    };
    let body = if looks_like_html(&body) {
        html_to_text(&body)
    } else {
        body
    };

    if body.chars().count() > max_chars {
        body.chars().take(max_chars).collect::<String>() + "\n...[truncated]"
    } else {
        body
    }
}

/// 通过 HTTP 下载文档
pub struct HttpDocumentSource {
    client: Client,
    max_result_chars: usize,
    max_body_bytes: usize,
}

impl HttpDocumentSource {
    pub fn new(timeout_secs: u64, max_result_chars: usize, max_body_bytes: usize) -> Self {
        const USER_AGENT: &str = concat!("rfp-triage/", env!("CARGO_PKG_VERSION"));
        let client = match Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    timeout_secs,
                    "http client build failed, falling back to a client without request timeout"
                );
                Client::new()
            }
        };
        Self {
            client,
            max_result_chars,
            max_body_bytes,
        }
    }

    pub fn from_config(section: &FetchSection) -> Self {
        Self::new(
            section.timeout_secs,
            section.max_result_chars,
            section.max_body_bytes,
        )
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn fetch(&self, url: &str) -> Result<String, GenerationError> {
        tracing::info!(url = %url, "fetching rfp document");
        let mut resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GenerationError::Fetch(format!("request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(GenerationError::Fetch(format!("HTTP {}", resp.status())));
        }

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| GenerationError::Fetch(format!("read body: {e}")))?
        {
            let room = self.max_body_bytes.saturating_sub(body.len());
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                tracing::debug!(url = %url, limit = self.max_body_bytes, "rfp document body capped");
                break;
            }
            body.extend_from_slice(&chunk);
        }

        let body = String::from_utf8_lossy(&body).into_owned();
        let text = normalize_body(body, self.max_result_chars);
        if text.trim().is_empty() {
            return Err(GenerationError::Fetch("document is empty".to_string()));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;

    #[test]
    fn test_html_is_converted_to_text() {
        let html = "<!DOCTYPE html><html><head><title>RFP</title></head><body><h1>Supply of Cables</h1><p>XLPE 1100V</p></body></html>";
        let text = normalize_body(html.to_string(), 8000);
        assert!(text.contains("Supply of Cables"));
        assert!(text.contains("XLPE 1100V"));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn test_plain_text_truncated_by_chars() {
        let text = normalize_body(format!("\u{FEFF}{}", "电缆招标".repeat(3)), 5);
        assert_eq!(text, "电缆招标电\n...[truncated]");
    }

    #[tokio::test]
    async fn test_body_read_stops_at_byte_limit() {
        let body = "a".repeat(10_000);
        let url = serve_once("200 OK", "text/plain", body).await;
        let source = HttpDocumentSource::new(5, 8000, 100);
        let text = source.fetch(&url).await.unwrap();
        assert_eq!(text, "a".repeat(100));
    }

    #[tokio::test]
    async fn test_http_error_status_is_fetch_error() {
        let url = serve_once("404 Not Found", "text/plain", "missing".to_string()).await;
        let source = HttpDocumentSource::new(5, 8000, 1024);
        let err = source.fetch(&url).await.unwrap_err();
        assert_eq!(err.kind(), "fetch");
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_strip_html_tags_fallback() {
        assert_eq!(strip_html_tags("<b>Net</b><i>90</i>"), "Net 90");
    }
}

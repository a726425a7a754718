//! Gemini summary provider.
//!
//! Calls `POST {base}/v1beta/models/{model}:generateContent`. Without an API
//! key a fixed placeholder summary is returned so local development works
//! offline.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{SummaryError, SummaryGenerator};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Returned when no API key is configured.
pub const PLACEHOLDER_SUMMARY: &str = "1. 概要：
開発環境用のダミー要約です。GEMINI_API_KEY が設定されていないため、実際の要約は生成されていません。

2. 主要なポイント：
- APIキーが設定されていないため、実際の要約は生成されていません
- 本番環境では .env に GEMINI_API_KEY を設定してください
- これはテスト用の表示です

3. 詳細な内容：
Gemini API を使用せずにダミーデータを表示しています。入力テキストの内容は反映されていません。";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

fn build_prompt(text: &str) -> String {
    format!(
        "以下のポッドキャストの内容を要約してください。
要約は以下の形式で出力してください：

1. 概要（100文字程度）
2. 主要なポイント（箇条書き3-5項目）
3. 詳細な内容（400文字程度）

入力テキスト：
{text}
"
    )
}

/// Summarizer backed by the Gemini `generateContent` API.
#[derive(Debug, Clone)]
pub struct GeminiSummarizer {
    http: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiSummarizer {
    /// An empty key is treated as missing.
    pub fn new(http: Client, api_key: Option<String>) -> Self {
        Self {
            http,
            api_key: api_key.filter(|k| !k.is_empty()),
            base_url: GEMINI_API_BASE.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl SummaryGenerator for GeminiSummarizer {
    async fn generate(&self, text: &str) -> Result<String, SummaryError> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("GEMINI_API_KEY is not set, returning placeholder summary");
            return Ok(PLACEHOLDER_SUMMARY.to_string());
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let prompt = build_prompt(text);
        let body = GenerateRequest {
            contents: [Content {
                parts: [RequestPart { text: &prompt }],
            }],
        };

        let resp = self
            .http
            .post(url)
            .query(&[("key", api_key)])
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| SummaryError::Provider(format!("Gemini request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(SummaryError::Provider(format!(
                "Gemini generateContent failed: {status} {body}"
            )));
        }

        let data: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| SummaryError::Provider(format!("Gemini response parse error: {e}")))?;

        let text: String = data
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(SummaryError::Empty);
        }
        debug!(model = %self.model, chars = text.chars().count(), "summary generated");
        Ok(text)
    }
}

// src/suggest/mod.rs
//
// Fallback label suggestions for column headers the synonym table cannot
// place. The provider is consumed as a short text-completion call and is
// always re-validated by the mapper; it is constructed once by the caller
// and injected, never held as a process-wide singleton.

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// A source of single-word column-label suggestions.
pub trait Suggest {
    fn suggest_label(&self, column: &str) -> Result<String>;
}

/// Provider used when no API key is configured: echoes the input, which the
/// mapper reads as "no suggestion".
pub struct NoSuggestions;

impl Suggest for NoSuggestions {
    fn suggest_label(&self, column: &str) -> Result<String> {
        Ok(column.to_string())
    }
}

const DEFAULT_BASE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// Gemini-backed suggestion client over a pooled blocking HTTP client.
pub struct GeminiSuggester {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiSuggester {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("building HTTP client")?;
        Ok(GeminiSuggester {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

impl Suggest for GeminiSuggester {
    fn suggest_label(&self, column: &str) -> Result<String> {
        if self.api_key.is_empty() {
            bail!("suggestion API key not configured");
        }

        let url = format!("{}?key={}", self.base_url, self.api_key);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: suggestion_prompt(column),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                max_output_tokens: 32,
            },
        };

        info!(column = %column, "requesting column-label suggestion");
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .context("sending suggestion request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("suggestion API returned {}: {}", status, body);
        }

        let reply: GenerateResponse = response
            .json()
            .context("decoding suggestion response")?;
        let text = reply
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .unwrap_or_default();

        let word = first_word(text);
        if word.is_empty() {
            bail!("suggestion API returned an empty reply");
        }
        debug!(column = %column, suggestion = %word, "suggestion received");
        Ok(word)
    }
}

fn suggestion_prompt(column: &str) -> String {
    format!(
        "Convert this column name '{}' to a standard financial statement column name. \
         Consider if it's related to date, amount, transaction type, or serial number. \
         Reply with a single word.",
        column
    )
}

/// First whitespace-separated word, stripped of surrounding punctuation.
fn first_word(text: &str) -> String {
    text.split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches(|c: char| !c.is_alphanumeric() && c != '/')
        .to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: i32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

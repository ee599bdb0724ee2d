use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::AiConfig;

const OPENROUTER_API: &str = "https://openrouter.ai/api/v1/chat/completions";
const OPENROUTER_MODEL: &str = "nvidia/nemotron-nano-12b-v2-vl:free";
const GEMINI_API: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";
const MAX_TOKENS: u32 = 300;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// A remote text-completion service. Both the caption provider and the chat
/// responder are written against this trait; the concrete backend is chosen
/// by which credentials are configured.
pub trait TextCompletion {
    fn name(&self) -> &'static str;

    /// Sends one completion request and returns the reply text verbatim.
    fn complete(&self, system: Option<&str>, user: &str) -> Result<String>;
}

/// Backends in preference order: OpenRouter first, Gemini as fallback.
/// Unconfigured backends are omitted; the result may be empty.
pub fn configured_backends(config: &AiConfig) -> Result<Vec<Box<dyn TextCompletion>>> {
    let mut backends: Vec<Box<dyn TextCompletion>> = Vec::new();
    if let Some(key) = &config.openrouter_api_key {
        backends.push(Box::new(OpenRouterBackend::new(key.clone())?));
    }
    if let Some(key) = &config.gemini_api_key {
        backends.push(Box::new(GeminiBackend::new(key.clone())?));
    }
    Ok(backends)
}

fn http_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("failed to build HTTP client")
}

pub struct OpenRouterBackend {
    client: Client,
    api_key: String,
}

impl OpenRouterBackend {
    pub fn new(api_key: String) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            api_key,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl TextCompletion for OpenRouterBackend {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    fn complete(&self, system: Option<&str>, user: &str) -> Result<String> {
        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": user }));

        let body = json!({
            "model": OPENROUTER_MODEL,
            "messages": messages,
            "max_tokens": MAX_TOKENS,
        });

        let response = self
            .client
            .post(OPENROUTER_API)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .context("failed to call OpenRouter chat completions API")?
            .error_for_status()
            .context("OpenRouter API returned an error status")?;

        let parsed: ChatCompletionResponse = response
            .json()
            .context("failed to decode OpenRouter response")?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("OpenRouter response contained no choices"))?;
        Ok(choice.message.content)
    }
}

pub struct GeminiBackend {
    client: Client,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(api_key: String) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            api_key,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

impl TextCompletion for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn complete(&self, system: Option<&str>, user: &str) -> Result<String> {
        // The generateContent shape has no system role; fold the instruction
        // into the single user text.
        let text = match system {
            Some(system) => format!("{system}\n\n{user}"),
            None => user.to_owned(),
        };

        let body = json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "generationConfig": { "maxOutputTokens": MAX_TOKENS },
        });

        let url = format!("{GEMINI_API}?key={}", self.api_key);
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .context("failed to call Gemini generateContent API")?
            .error_for_status()
            .context("Gemini API returned an error status")?;

        let parsed: GenerateContentResponse = response
            .json()
            .context("failed to decode Gemini response")?;
        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Gemini response contained no candidates"))?;
        let part = candidate
            .content
            .parts
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Gemini response contained no text parts"))?;
        Ok(part.text)
    }
}

//! Gemini REST gateway with search grounding.
//!
//! Sends `generateContent` requests with the google_search tool enabled and
//! reshapes the reply into plain answer text plus a deduplicated citation
//! list. Failures are normalized into [`AnalystError::Gateway`]; no retry is
//! attempted and no partial result is returned.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use agroclimate_core::error::{AnalystError, Result};
use agroclimate_core::gateway::{QueryGateway, QueryReply};
use agroclimate_core::source::{Source, UNTITLED_SOURCE, dedupe_sources};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Environment variable holding the required API credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const SYSTEM_INSTRUCTION: &str = "You are an expert data analyst specializing in Indian governance, agriculture, and climate science. \
Your primary data source is the official Government of India portal, data.gov.in. \
When a user asks a question, you must use your grounding in Google Search to find and analyze the most relevant and up-to-date datasets exclusively from data.gov.in. \
Synthesize information from multiple datasets to provide a comprehensive, accurate answer. \
Format your response using Markdown for clarity (e.g., use tables for comparisons, lists for items). \
CRITICAL: You must cite every data point by referencing the title and URL of the source dataset from data.gov.in. List all sources clearly under a 'Sources' heading at the end of your response.";

/// Gateway that talks to the Gemini HTTP API.
#[derive(Clone, Debug)]
pub struct GeminiGateway {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiGateway {
    /// Creates a new gateway with the provided API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Loads the API key from the process environment.
    ///
    /// The credential is required; its absence is a configuration error the
    /// caller must treat as fatal at startup.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            AnalystError::config(format!("{API_KEY_ENV} environment variable is not set"))
        })?;
        Ok(Self::new(api_key))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| AnalystError::gateway(format!("Gemini API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        response
            .json()
            .await
            .map_err(|err| AnalystError::gateway(format!("Failed to parse Gemini response: {err}")))
    }
}

#[async_trait]
impl QueryGateway for GeminiGateway {
    async fn run_query(&self, prompt: &str) -> Result<QueryReply> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            system_instruction: Content {
                role: "model".to_string(),
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION.to_string(),
                }],
            },
            tools: vec![Tool::default()],
        };

        tracing::debug!(model = %self.model, "sending generateContent request");
        let response = self.send_request(&request).await?;
        extract_reply(response)
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    tools: Vec<Tool>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize, Default)]
struct Tool {
    google_search: GoogleSearchConfig,
}

#[derive(Serialize, Default)]
struct GoogleSearchConfig {}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "groundingMetadata")]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<PartResponse>>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GroundingMetadata {
    #[serde(rename = "groundingChunks")]
    grounding_chunks: Option<Vec<GroundingChunk>>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Reshapes a parsed response into answer text plus deduplicated sources.
///
/// Grounding metadata is read from the first candidate only; any absent
/// level of the optional chain yields an empty source list rather than an
/// error. A response with no text at all is a gateway error.
fn extract_reply(response: GenerateContentResponse) -> Result<QueryReply> {
    let mut candidates = response.candidates.unwrap_or_default();
    if candidates.is_empty() {
        return Err(AnalystError::gateway(
            "Gemini API returned no response candidates",
        ));
    }
    let first = candidates.remove(0);

    let text_parts: Vec<String> = first
        .content
        .and_then(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .filter(|text| !text.trim().is_empty())
        .collect();

    if text_parts.is_empty() {
        return Err(AnalystError::gateway(
            "Gemini API returned no text in the response candidates",
        ));
    }

    let candidates_sources: Vec<Source> = first
        .grounding_metadata
        .and_then(|metadata| metadata.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .map(|web| {
            let title = match web.title {
                Some(title) if !title.is_empty() => title,
                _ => UNTITLED_SOURCE.to_string(),
            };
            Source::new(web.uri.unwrap_or_default(), title)
        })
        .filter(|source| !source.uri.is_empty())
        .collect();

    Ok(QueryReply {
        text: text_parts.join("\n\n"),
        sources: dedupe_sources(candidates_sources),
    })
}

fn map_http_error(status: StatusCode, body: String) -> AnalystError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    AnalystError::gateway(format!("HTTP {}: {message}", status.as_u16()))
}

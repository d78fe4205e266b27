//! Waste classification through an OpenAI-compatible chat-completions vision model.
//!
//! The classifier never fails outward: any missing key, transport error, bad status or unusable
//! reply degrades to a single [`DetectedItem::unknown`] so a scan always produces a result.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::HeaderMap;
use http::header::{AUTHORIZATION, HeaderValue, InvalidHeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use crate::constants::{
    APP_TITLE, DEFAULT_OPENAI_MODEL, OPENAI_API_BASE, OPENROUTER_API_BASE, VISION_MAX_TOKENS,
    VISION_TEMPERATURE,
};
use crate::db::models::detection::DetectedItem;
use crate::util::env::Env;

const CLASSIFY_PROMPT: &str = "You are a waste sorting assistant. Analyze the image content and output ONLY a JSON array. \
NO extra text. Each array element must be an object with exactly these keys: \
item (string), confidence (float in 0..1), disposal_method (string), bin_type (string from {general, recycling, organic, hazardous}).\n\
Rules:\n- If plastic, paper, metal, glass: bin_type=recycling and disposal_method='Recycling'.\n\
- If food/organic: bin_type=organic and disposal_method='Compost' or 'Organic Waste'.\n\
- If batteries/chemicals/e-waste: bin_type=hazardous and disposal_method='Hazardous Waste'.\n\
- If uncertain, return a single generic item with confidence 0.5 and bin_type=general.\n\
Scoring guidance (client awards points in buckets from your confidence):\n\
- confidence < 0.60 -> 5 points\n- 0.60-0.84 -> 10 points\n- 0.85-0.94 -> 15 points\n- >= 0.95 -> 20 points.\n\
Return STRICT JSON only, e.g.: \
[{\"item\":\"Plastic Bottle\",\"confidence\":0.92,\"disposal_method\":\"Recycling\",\"bin_type\":\"recycling\"}]";

/// Where classification requests go and how they are authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionProvider {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    /// `(HTTP-Referer, X-Title)` attribution headers, sent to OpenRouter only.
    pub attribution: Option<(String, String)>,
}

impl VisionProvider {
    /// OpenRouter when its key is set, else OpenAI, else nothing.
    pub fn from_env(env: &Env) -> Option<Self> {
        if let Some(key) = env.openrouter_api_key.as_ref() {
            return Some(Self {
                api_base: env
                    .vision_api_base
                    .clone()
                    .unwrap_or_else(|| OPENROUTER_API_BASE.to_string()),
                api_key: key.clone(),
                model: env.openrouter_model.clone(),
                attribution: Some((env.app_url.clone(), APP_TITLE.to_string())),
            });
        }

        env.openai_api_key.as_ref().map(|key| Self {
            api_base: env
                .vision_api_base
                .clone()
                .unwrap_or_else(|| OPENAI_API_BASE.to_string()),
            api_key: key.clone(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            attribution: None,
        })
    }

    fn headers(&self) -> VisionResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );

        if let Some((referer, title)) = &self.attribution {
            headers.insert("HTTP-Referer", HeaderValue::from_str(referer)?);
            headers.insert("X-Title", HeaderValue::from_str(title)?);
        }

        Ok(headers)
    }
}

#[derive(Debug, Clone)]
pub struct VisionClient {
    client: reqwest::Client,
    provider: Option<VisionProvider>,
}

impl VisionClient {
    pub fn new(provider: Option<VisionProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            provider,
        }
    }

    pub fn from_env(env: &Env) -> Self {
        let provider = VisionProvider::from_env(env);
        match &provider {
            Some(p) => tracing::info!(api_base = %p.api_base, model = %p.model, "vision model configured"),
            None => tracing::warn!("no vision api key configured; scans will report unknown items"),
        }

        Self::new(provider)
    }

    /// Classifies the items in a JPEG image. Always returns at least one item.
    #[instrument(skip(self, image), fields(image_bytes = image.len()))]
    pub async fn classify(&self, image: &[u8]) -> Vec<DetectedItem> {
        let items = match self.complete(image).await {
            Ok(reply) => parse_items(&reply),
            Err(e) => {
                tracing::error!(error = %e, "vision request failed");
                Vec::new()
            }
        };

        if items.is_empty() {
            tracing::debug!("falling back to unknown item");
            vec![DetectedItem::unknown()]
        } else {
            items
        }
    }

    /// Sends the image to the model and returns the text of the first choice.
    async fn complete(&self, image: &[u8]) -> VisionResult<String> {
        let provider = self.provider.as_ref().ok_or(VisionErr::NotConfigured)?;

        let body = ChatRequest {
            model: &provider.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: CLASSIFY_PROMPT,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/jpeg;base64,{}", STANDARD.encode(image)),
                        },
                    },
                ],
            }],
            max_tokens: VISION_MAX_TOKENS,
            temperature: VISION_TEMPERATURE,
        };

        let res = self
            .client
            .post(format!(
                "{}/chat/completions",
                provider.api_base.trim_end_matches('/')
            ))
            .headers(provider.headers()?)
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(VisionErr::Status { status, body });
        }

        let completion: ChatCompletion = res.json().await?;
        tracing::debug!(model = %provider.model, choices = completion.choices.len(), "vision reply");

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(VisionErr::EmptyReply)
    }
}

/// Pulls the outermost `[...]` out of a model reply and keeps every element that is a well-formed
/// item. Anything unusable yields an empty list.
pub fn parse_items(reply: &str) -> Vec<DetectedItem> {
    let (Some(start), Some(end)) = (reply.find('['), reply.rfind(']')) else {
        return Vec::new();
    };
    if end < start {
        return Vec::new();
    }

    match serde_json::from_str::<Vec<Value>>(&reply[start..=end]) {
        Ok(values) => values
            .into_iter()
            .filter_map(|v| serde_json::from_value::<DetectedItem>(v).ok())
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "vision reply was not a JSON array");
            Vec::new()
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

pub type VisionResult<T> = core::result::Result<T, VisionErr>;

#[derive(Debug, Error)]
pub enum VisionErr {
    #[error("no vision api key configured")]
    NotConfigured,

    #[error("vision api returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("vision api reply had no content")]
    EmptyReply,

    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    #[error(transparent)]
    InvalidHeader(#[from] InvalidHeaderValue),
}

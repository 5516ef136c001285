use crate::{
    config::GeminiConfig,
    error::{FusionError, Result},
    models::EncodedImage,
    options::GenerationOptions,
    providers::{prompt::build_prompt, GenerationService},
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-image-preview";

#[derive(Clone)]
pub struct GeminiFusionClient {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl GeminiFusionClient {
    pub fn new(config: GeminiConfig, timeout: Duration) -> Result<Self> {
        let api_key = config
            .api_key
            .ok_or_else(|| FusionError::ConfigError("Gemini API key required".into()))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FusionError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            api_base: config
                .api_base
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            model: config
                .model
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        })
    }

    fn endpoint(&self) -> String {
        let model = self.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }
}

fn inline_part(image: &EncodedImage) -> Value {
    json!({
        "inlineData": {
            "mimeType": image.mime_type(),
            "data": image.base64_data(),
        }
    })
}

fn build_payload(
    image1: &EncodedImage,
    image2: &EncodedImage,
    options: &GenerationOptions,
) -> Value {
    json!({
        "contents": [{
            "parts": [
                inline_part(image1),
                inline_part(image2),
                { "text": build_prompt(options) }
            ]
        }],
        "generationConfig": {
            "responseModalities": ["IMAGE", "TEXT"]
        }
    })
}

/// Pulls the first inline image out of a `generateContent` response.
fn extract_image(response: &Value) -> Result<EncodedImage> {
    let parts = response
        .get("candidates")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|candidate| candidate.pointer("/content/parts").and_then(Value::as_array))
        .flatten();

    for part in parts {
        let Some(inline) = part.get("inlineData").or_else(|| part.get("inline_data")) else {
            continue;
        };
        let data = inline.get("data").and_then(Value::as_str).unwrap_or_default();
        if data.is_empty() {
            continue;
        }
        let mime_type = inline
            .get("mimeType")
            .or_else(|| inline.get("mime_type"))
            .and_then(Value::as_str)
            .unwrap_or("image/png");
        return EncodedImage::from_base64(mime_type, data);
    }

    let reason = response
        .pointer("/promptFeedback/blockReason")
        .and_then(Value::as_str)
        .unwrap_or("no image part in response");
    Err(FusionError::ResponseError(format!(
        "Gemini returned no image: {}",
        reason
    )))
}

#[async_trait]
impl GenerationService for GeminiFusionClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(
        &self,
        image1: &EncodedImage,
        image2: &EncodedImage,
        options: &GenerationOptions,
    ) -> Result<EncodedImage> {
        let payload = build_payload(image1, image2, options);

        log::info!("Generating fusion image with model: {}", self.model);

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| FusionError::RequestError(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Gemini responded with {}: {}", status, body);
            return Err(FusionError::RequestError(format!(
                "Gemini responded with status {}",
                status
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FusionError::ResponseError(e.to_string()))?;

        extract_image(&body)
    }
}

mod types;

use async_trait::async_trait;
use std::sync::Arc;

pub use types::*;

use crate::config::Config;
use crate::core::{build_prompt, data_uri, GenerationSettings, QualityTier, StudioError};
use crate::credentials::CredentialSelector;
use crate::http_client::HTTP_CLIENT;
use crate::studio::ImageGenerator;

/// MIME type inline source images are tagged with
const SOURCE_IMAGE_MIME: &str = "image/png";

/// Gemini API client
pub struct GeminiClient {
    api_key: Option<String>,
    high_tier_key: Option<String>,
    base_url: String,
    standard_model: String,
    high_tier_model: String,
    selector: Option<Arc<dyn CredentialSelector>>,
}

impl GeminiClient {
    /// Create a new client from config
    pub fn from_config(config: &Config, selector: Option<Arc<dyn CredentialSelector>>) -> Self {
        Self {
            api_key: config.api_key().map(str::to_string),
            high_tier_key: config.high_tier_key().map(str::to_string),
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            standard_model: config.api.standard_model.clone(),
            high_tier_model: config.api.high_tier_model.clone(),
            selector,
        }
    }

    /// Model used for a tier
    pub fn model_for(&self, tier: QualityTier) -> &str {
        match tier {
            QualityTier::Standard => &self.standard_model,
            QualityTier::High => &self.high_tier_model,
        }
    }

    /// Generate an image and return it as a data URI
    pub async fn generate(&self, settings: &GenerationSettings) -> Result<String, StudioError> {
        let tier = settings.tier();

        if tier.is_high() {
            if let Some(selector) = &self.selector {
                if !selector.has_selected_credential().await {
                    tracing::info!("No high-tier key selected, opening selector");
                    if let Err(e) = selector.open_credential_selector().await {
                        tracing::warn!("Credential selection failed: {:#}", e);
                    }
                }
            }
        }

        let request = build_request(settings)?;
        let model = self.model_for(tier).to_string();

        let result = match self.api_key_for(tier) {
            Some(key) => self.send(&model, &key, &request).await,
            None => Err(StudioError::MissingApiKey),
        };

        match result {
            Ok(response) => extract_image(response),
            Err(err) => {
                if err.is_entity_not_found() && tier.is_high() {
                    if let Some(selector) = &self.selector {
                        tracing::info!("Key rejected for {}, reopening selector", model);
                        if let Err(e) = selector.open_credential_selector().await {
                            tracing::warn!("Credential selection failed: {:#}", e);
                        }
                    }
                }
                Err(err)
            }
        }
    }

    /// Resolve the key right before the call so a fresh selection is picked up
    fn api_key_for(&self, tier: QualityTier) -> Option<String> {
        match tier {
            QualityTier::High => self
                .selector
                .as_ref()
                .and_then(|s| s.selected_credential())
                .or_else(|| self.high_tier_key.clone())
                .or_else(|| self.api_key.clone()),
            QualityTier::Standard => self.api_key.clone(),
        }
    }

    async fn send(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, StudioError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        tracing::debug!("Sending generate request to: {}", url);

        let response = HTTP_CLIENT
            .post(&url)
            .query(&[("key", api_key)])
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!("Response status: {}", status);

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            tracing::debug!("API error {}: {}", status, message);
            return Err(StudioError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| StudioError::InvalidResponse(format!("failed to parse response: {}", e)))
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate(&self, settings: &GenerationSettings) -> Result<String, StudioError> {
        GeminiClient::generate(self, settings).await
    }
}

/// Build the API request body for a settings snapshot
pub fn build_request(settings: &GenerationSettings) -> Result<GenerateRequest, StudioError> {
    let mut parts = vec![ContentPart::Text {
        text: build_prompt(settings),
    }];

    // Source image goes before the text
    if let Some(source) = settings.source_image.as_deref().filter(|s| !s.is_empty()) {
        data_uri::decode(source)?;
        parts.insert(
            0,
            ContentPart::InlineData {
                inline_data: InlineData {
                    mime_type: SOURCE_IMAGE_MIME.to_string(),
                    data: data_uri::payload(source).trim().to_string(),
                },
            },
        );
    }

    let image_size = settings
        .tier()
        .is_high()
        .then(|| settings.quality.as_str().to_string());

    Ok(GenerateRequest {
        contents: vec![Content { parts, role: None }],
        generation_config: Some(GenerationConfig {
            image_config: Some(ImageConfig {
                aspect_ratio: Some(settings.aspect_ratio.as_str().to_string()),
                image_size,
            }),
        }),
    })
}

/// Pull the first inline image out of the first candidate
pub fn extract_image(response: GenerateResponse) -> Result<String, StudioError> {
    if let Some(reason) = response.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_deref()) {
        tracing::warn!("Prompt blocked: {}", reason);
    }

    let candidate = response.candidates.and_then(|c| c.into_iter().next());

    let Some(candidate) = candidate else {
        return Err(StudioError::NoImageReturned);
    };

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason != "STOP" && reason != "MAX_TOKENS" {
            tracing::warn!(
                "Generation finished with {}: {}",
                reason,
                candidate.finish_message.as_deref().unwrap_or("no message")
            );
        }
    }

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    for part in &parts {
        if let ContentPart::Text { text } = part {
            tracing::debug!("Response text: {}", text);
        }
    }

    let inline = parts
        .iter()
        .filter_map(ContentPart::inline_data)
        .find(|d| !d.data.is_empty())
        .ok_or(StudioError::NoImageReturned)?;

    let mime = if inline.mime_type.is_empty() {
        SOURCE_IMAGE_MIME
    } else {
        inline.mime_type.as_str()
    };
    Ok(data_uri::to_data_uri(mime, &inline.data))
}

#[cfg(test)]
mod tests;

use anyhow::anyhow;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::models::TabletImage;

/// Multimodal `generateContent` client for the Gemini REST API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Summarize the tablet image. Failures come back as displayable text.
    pub async fn summarize(&self, prompt: &str, image: &TabletImage) -> String {
        match self.generate(prompt, image).await {
            Ok(text) => text,
            Err(e) => {
                error!("Gemini request failed: {:#}", e);
                format!("Error from Gemini API: {}", e)
            }
        }
    }

    pub async fn generate(&self, prompt: &str, image: &TabletImage) -> anyhow::Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let payload = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [
                        { "text": prompt },
                        {
                            "inline_data": {
                                "mime_type": image.mime_type,
                                "data": STANDARD.encode(&image.data)
                            }
                        }
                    ]
                }
            ]
        });

        info!(
            "Calling Gemini model {} with {} byte image",
            self.model,
            image.data.len()
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body["error"]["message"].as_str().unwrap_or("no details");
            return Err(anyhow!("request failed with status {}: {}", status, message));
        }

        let response_json: Value = response.json().await?;
        extract_text(&response_json)
    }
}

fn extract_text(response_json: &Value) -> anyhow::Result<String> {
    let parts = response_json["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| anyhow!("Invalid response format from Gemini"))?;

    let text = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(anyhow!("Gemini returned no text"));
    }
    Ok(text)
}

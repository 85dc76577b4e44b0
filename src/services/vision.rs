use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Instruction sent with every image; names the exact JSON fields we read back.
pub const BREED_PROMPT: &str = concat!(
    "Can you provide a JSON object with details such as height (as the field name \"height\"), ",
    "weight (as the field name \"weight\"), lifespan (as the field name \"lifespan\"), ",
    "breed (as the field name \"breed\"), breed group (only group name, not including \"Group\", ",
    "as the field name \"breed_group\"), shed level (as the field name \"shed_level\"), ",
    "temperament (in a list, as the field name \"temperament\"), energy level (as the field name ",
    "\"energy_level\"), and common health concerns (in the list, as the field name ",
    "\"common_health_concerns\") about the dog in the image? Format the response in JSON."
);

/// Errors that can occur when calling the vision model API
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Anything that can turn a base64 image into completion text
#[async_trait]
pub trait CompletionSource: Send + Sync {
    async fn describe_image(&self, image_base64: &str) -> Result<String, InferenceError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
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

/// Client for an OpenAI-compatible chat completion endpoint
pub struct VisionClient {
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    client: Client,
}

impl VisionClient {
    /// Create a new client; `timeout` bounds each request end to end
    pub fn new(
        endpoint: String,
        api_key: String,
        model: String,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self, InferenceError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            api_key,
            model,
            max_tokens,
            client,
        })
    }

    fn build_request<'a>(&'a self, image_base64: &str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: BREED_PROMPT },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/jpeg;base64,{}", image_base64),
                        },
                    },
                ],
            }],
            max_tokens: self.max_tokens,
        }
    }
}

/// Pull `choices[0].message.content` out of a chat completion body
pub fn completion_text(body: &Value) -> Result<String, InferenceError> {
    let choices = body
        .get("choices")
        .and_then(|c| c.as_array())
        .ok_or_else(|| InferenceError::InvalidResponse("Missing choices array".into()))?;

    let first = choices
        .first()
        .ok_or_else(|| InferenceError::InvalidResponse("Empty choices array".into()))?;

    first
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| InferenceError::InvalidResponse("Missing message content".into()))
}

#[async_trait]
impl CompletionSource for VisionClient {
    async fn describe_image(&self, image_base64: &str) -> Result<String, InferenceError> {
        let payload = self.build_request(image_base64);

        tracing::debug!(
            "Requesting completion from {} (model: {}, image: {} chars)",
            self.endpoint,
            self.model,
            image_base64.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(InferenceError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Vision API returned {}: {}", status, body);
            return Err(InferenceError::ApiError(format!("Completion request failed: {}", status)));
        }

        let json: Value = response.json().await?;
        tracing::debug!("Response data: {}", json);

        completion_text(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> VisionClient {
        VisionClient::new(
            "https://vision.test/v1/chat/completions".to_string(),
            "test_key".to_string(),
            "gpt-4o".to_string(),
            900,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_request_shape() {
        let client = client();
        let payload = serde_json::to_value(client.build_request("QUJD")).unwrap();

        assert_eq!(payload["model"], "gpt-4o");
        assert_eq!(payload["max_tokens"], 900);
        assert_eq!(payload["messages"][0]["role"], "user");

        let content = &payload["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], BREED_PROMPT);
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "data:image/jpeg;base64,QUJD");
    }

    #[test]
    fn test_prompt_names_every_field() {
        for field in [
            "height", "weight", "lifespan", "breed", "breed_group", "shed_level",
            "temperament", "energy_level", "common_health_concerns",
        ] {
            assert!(BREED_PROMPT.contains(&format!("\"{}\"", field)), "missing {}", field);
        }
    }

    #[test]
    fn test_completion_text_extraction() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "hello"}}]});
        assert_eq!(completion_text(&body).unwrap(), "hello");

        let empty = json!({"choices": []});
        assert!(matches!(completion_text(&empty), Err(InferenceError::InvalidResponse(_))));

        let error_body = json!({"error": {"message": "bad key"}});
        assert!(matches!(completion_text(&error_body), Err(InferenceError::InvalidResponse(_))));

        let null_content = json!({"choices": [{"message": {"content": null}}]});
        assert!(completion_text(&null_content).is_err());
    }
}

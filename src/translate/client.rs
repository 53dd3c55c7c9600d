//! OpenAI-compatible chat-completions translator.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::config::Config;
use crate::core::{
    StringTable,
    retry::{RetryPolicy, with_retry_if},
};
use crate::translate::{
    ChunkRequest, Translator,
    error::TranslatorError,
    prompt::{system_prompt, user_prompt},
    provider::Provider,
};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Settings for [`AiTranslator`].
#[derive(Debug, Clone)]
pub struct AiSettings {
    pub provider: Provider,
    pub model: String,
    pub temperature: f32,
    pub api_key: Option<String>,
    /// Overrides the provider's base URL.
    pub api_url: Option<String>,
    pub timeout: Duration,
    /// Project description appended to the system prompt.
    pub context: String,
    pub retry: RetryPolicy,
}

impl AiSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            provider: config.provider(),
            model: config.ai.model.clone(),
            temperature: config.ai.temperature,
            api_key: config.api_key(),
            api_url: config.ai.api_url.clone(),
            timeout: Duration::from_secs(config.ai.timeout_secs),
            context: config.context.clone(),
            retry: RetryPolicy::new(
                config.translation.max_retries,
                Duration::from_secs(config.translation.retry_delay_secs),
            ),
        }
    }
}

#[derive(Debug)]
pub struct AiTranslator {
    http: Client,
    endpoint: String,
    system_prompt: String,
    settings: AiSettings,
}

impl AiTranslator {
    pub fn new(settings: AiSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let base = settings
            .api_url
            .as_deref()
            .unwrap_or_else(|| settings.provider.base_url())
            .trim_end_matches('/');
        let endpoint = format!("{base}/chat/completions");

        Ok(Self {
            http,
            endpoint,
            system_prompt: system_prompt(&settings.context),
            settings,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, request: &ChunkRequest) -> Result<StringTable, TranslatorError> {
        let body = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: Some(self.system_prompt.clone()),
                },
                Message {
                    role: "user".to_string(),
                    content: Some(user_prompt(&request.entries, &request.from, &request.to)),
                },
            ],
            temperature: self.settings.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let mut builder = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = &self.settings.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslatorError::Status { status, body });
        }

        let chat: ChatResponse = response.json().await.map_err(classify)?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(TranslatorError::EmptyResponse)?;

        parse_translations(&content)
    }
}

impl Translator for AiTranslator {
    async fn translate(&self, request: &ChunkRequest) -> StringTable {
        let operation = format!(
            "{} translation {} -> {} ({} strings)",
            self.settings.provider,
            request.from,
            request.to,
            request.entries.len()
        );

        match with_retry_if(
            &self.settings.retry,
            &operation,
            || self.request(request),
            TranslatorError::is_retryable,
        )
        .await
        {
            Ok(translations) => {
                debug!(
                    "{}: received {}/{} translations",
                    operation,
                    translations.len(),
                    request.entries.len()
                );
                translations
            }
            Err(e) => {
                error!("{} failed: {}", operation, e);
                StringTable::new()
            }
        }
    }
}

fn classify(e: reqwest::Error) -> TranslatorError {
    if e.is_timeout() {
        TranslatorError::Timeout
    } else {
        TranslatorError::Http(e)
    }
}

/// Parse the model's reply as a flat JSON object, keeping string values.
///
/// A reply wrapped in a Markdown code fence is accepted.
fn parse_translations(content: &str) -> Result<StringTable, TranslatorError> {
    let json = strip_code_fence(content);
    let value: Value = serde_json::from_str(json)
        .map_err(|e| TranslatorError::MalformedResponse(e.to_string()))?;

    let Value::Object(object) = value else {
        return Err(TranslatorError::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    };

    Ok(object
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(text) => Some((key, text)),
            _ => None,
        })
        .collect())
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    fn settings(server: &MockServer) -> AiSettings {
        AiSettings {
            provider: Provider::Custom(server.uri()),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            api_key: Some("test-key".to_string()),
            api_url: None,
            timeout: Duration::from_secs(5),
            context: String::new(),
            retry: RetryPolicy::new(3, Duration::ZERO),
        }
    }

    fn chat_response(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "gpt-4o-mini",
            "choices": [
                {
                    "index": 0,
                    "message": { "role": "assistant", "content": content },
                    "finish_reason": "stop"
                }
            ]
        })
    }

    fn request(entries: &[(&str, &str)]) -> ChunkRequest {
        ChunkRequest {
            from: "en".to_string(),
            to: "es".to_string(),
            entries: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_parse_translations_keeps_strings() {
        let parsed = parse_translations(r#"{"Save": "Guardar", "Count": 3}"#).unwrap();
        let expected: StringTable = [("Save".to_string(), "Guardar".to_string())].into();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parse_translations_accepts_code_fence() {
        let parsed = parse_translations("```json\n{\"Save\": \"Guardar\"}\n```").unwrap();
        assert_eq!(parsed["Save"], "Guardar");
    }

    #[test]
    fn test_parse_translations_rejects_non_objects() {
        assert!(matches!(
            parse_translations("[\"Guardar\"]"),
            Err(TranslatorError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_translations("Guardar"),
            Err(TranslatorError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_endpoint_prefers_api_url() {
        let settings = AiSettings {
            api_url: Some("https://gateway.example.com/v1/".to_string()),
            ..AiSettings::from_config(&Config::default())
        };
        let translator = AiTranslator::new(settings).unwrap();
        assert_eq!(
            translator.endpoint(),
            "https://gateway.example.com/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_translate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "response_format": { "type": "json_object" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(
                r#"{"Save": "Guardar", "Cancel": "Cancelar"}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let translator = AiTranslator::new(settings(&server)).unwrap();
        let result = translator
            .translate(&request(&[("Save", "Save"), ("Cancel", "Cancel")]))
            .await;

        assert_eq!(result["Save"], "Guardar");
        assert_eq!(result["Cancel"], "Cancelar");
    }

    #[tokio::test]
    async fn test_translate_retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(chat_response(r#"{"Save": "Guardar"}"#)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let translator = AiTranslator::new(settings(&server)).unwrap();
        let result = translator.translate(&request(&[("Save", "Save")])).await;

        assert_eq!(result["Save"], "Guardar");
    }

    #[tokio::test]
    async fn test_translate_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .expect(1)
            .mount(&server)
            .await;

        let translator = AiTranslator::new(settings(&server)).unwrap();
        let result = translator.translate(&request(&[("Save", "Save")])).await;

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_translate_exhaustion_returns_empty_map() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("not json")))
            .expect(3)
            .mount(&server)
            .await;

        let translator = AiTranslator::new(settings(&server)).unwrap();
        let result = translator.translate(&request(&[("Save", "Save")])).await;

        assert!(result.is_empty());
    }
}

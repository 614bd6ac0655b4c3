//! Client for OpenAI-compatible chat completion endpoints.

use super::{CompletionGateway, LlmError};

/// Configuration for the chat completion client.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL; `/v1/chat/completions` is appended.
    pub base_url: String,
    /// Model name to use.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            model: "gpt-3.5-turbo".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            timeout_secs: 120,
        }
    }
}

/// Blocking chat completion client.
///
/// The API key is read when a request is made, so a client can be built
/// (and the graph browsed) without credentials.
pub struct OpenAiClient {
    config: OpenAiConfig,
    last_fingerprint: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            config,
            last_fingerprint: None,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn api_key(&self) -> Result<String, LlmError> {
        std::env::var(&self.config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| LlmError::MissingApiKey {
                var: self.config.api_key_env.clone(),
            })
    }

    fn request_body(&self, query: &str, seed: u64) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "seed": seed,
            "messages": [
                {
                    "role": "system",
                    "content": format!("User: {query}"),
                }
            ],
        })
    }
}

/// Reply text and fingerprint extracted from a chat completion response body.
fn parse_response(body: &str) -> Result<(String, Option<String>), LlmError> {
    let json: serde_json::Value =
        serde_json::from_str(body).map_err(|e| LlmError::ParseError {
            message: e.to_string(),
        })?;

    let content = json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| LlmError::ParseError {
            message: "missing 'choices[0].message.content' field".into(),
        })?
        .to_string();
    let fingerprint = json["system_fingerprint"].as_str().map(|s| s.to_string());
    Ok((content, fingerprint))
}

impl CompletionGateway for OpenAiClient {
    fn complete(&mut self, query: &str, seed: u64) -> Result<String, LlmError> {
        let key = self.api_key()?;
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(self.config.timeout_secs))
            .build();

        let body_str = serde_json::to_string(&self.request_body(query, seed)).map_err(|e| {
            LlmError::RequestFailed {
                message: format!("JSON serialize error: {e}"),
            }
        })?;

        tracing::debug!(model = %self.config.model, seed, "sending completion request");
        let resp = match agent
            .post(&self.endpoint())
            .set("Content-Type", "application/json")
            .set("Authorization", &format!("Bearer {key}"))
            .send_string(&body_str)
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                let detail = resp.into_string().unwrap_or_default();
                return Err(LlmError::RequestFailed {
                    message: format!("server returned status {code}: {detail}"),
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(LlmError::RequestFailed {
                    message: transport.to_string(),
                });
            }
        };

        let resp_str = resp.into_string().map_err(|e| LlmError::ParseError {
            message: e.to_string(),
        })?;
        let (content, fingerprint) = parse_response(&resp_str)?;
        tracing::info!(
            model = %self.config.model,
            fingerprint = fingerprint.as_deref().unwrap_or("-"),
            "completion received"
        );
        self.last_fingerprint = fingerprint;
        Ok(content)
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn fingerprint(&self) -> Option<&str> {
        self.last_fingerprint.as_deref()
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = OpenAiConfig::default();
        assert_eq!(config.base_url, "https://api.openai.com");
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let client = OpenAiClient::new(OpenAiConfig {
            base_url: "http://localhost:8080/".into(),
            ..Default::default()
        });
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn request_carries_model_seed_and_query() {
        let client = OpenAiClient::new(OpenAiConfig::default());
        let body = client.request_body("name things", 42);
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["seed"], 42);
        assert_eq!(body["messages"][0]["content"], "User: name things");
    }

    #[test]
    fn parse_response_extracts_content_and_fingerprint() {
        let body = r#"{
            "id": "chatcmpl-1",
            "system_fingerprint": "fp_abc",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "[\"Mechanics\"]"}}]
        }"#;
        let (content, fingerprint) = parse_response(body).unwrap();
        assert_eq!(content, "[\"Mechanics\"]");
        assert_eq!(fingerprint.as_deref(), Some("fp_abc"));
    }

    #[test]
    fn parse_response_allows_null_fingerprint() {
        let body = r#"{"system_fingerprint": null, "choices": [{"message": {"content": "[]"}}]}"#;
        let (_, fingerprint) = parse_response(body).unwrap();
        assert_eq!(fingerprint, None);
    }

    #[test]
    fn parse_response_rejects_missing_content() {
        assert!(matches!(
            parse_response(r#"{"choices": []}"#),
            Err(LlmError::ParseError { .. })
        ));
        assert!(matches!(
            parse_response("not json"),
            Err(LlmError::ParseError { .. })
        ));
    }

    #[test]
    fn missing_key_fails_before_any_request() {
        let mut client = OpenAiClient::new(OpenAiConfig {
            api_key_env: "KNOWGEN_TEST_KEY_THAT_IS_NEVER_SET".into(),
            base_url: "http://127.0.0.1:1".into(),
            ..Default::default()
        });
        let err = client.complete("anything", 0).unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey { .. }));
        assert_eq!(client.fingerprint(), None);
    }
}

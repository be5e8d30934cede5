use serde::{Deserialize, Serialize};
use tracing::debug;
use ureq::Agent;

use crate::config::Config;
use crate::service::{LlmCall, ReasoningService, ServiceError};
use crate::sink::{TraceSink, traced};
use crate::tools::{agent, post_json};

/// OpenAI-compatible chat-completions client.
pub struct OpenAiClient {
    http: Agent,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: agent(config.timeout()),
            endpoint: format!(
                "{}/chat/completions",
                config.openai_base_url.trim_end_matches('/')
            ),
            api_key: config.openai_api_key.clone(),
            model: config.model.clone(),
        }
    }

    fn request_body(&self, prompt: &str) -> Result<serde_json::Value, ServiceError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };
        Ok(serde_json::to_value(&request)?)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn parse_reply(body: serde_json::Value) -> Result<String, ServiceError> {
    let response: ChatResponse = serde_json::from_value(body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(ServiceError::Empty)
}

impl ReasoningService for OpenAiClient {
    fn complete(&self, call: &LlmCall<'_>, sink: &dyn TraceSink) -> Result<String, ServiceError> {
        traced(sink, call, || {
            let body = self.request_body(call.prompt)?;
            debug!(step = call.step, model = %self.model, "posting chat completion");
            let reply = post_json(&self.http, &self.endpoint, Some(&self.api_key), &body)?;
            parse_reply(reply)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::NoopSink;
    use serde_json::json;

    fn config() -> Config {
        Config {
            openai_api_key: "sk-test".into(),
            openai_base_url: "http://localhost:1/v1/".into(),
            ..Config::default()
        }
    }

    #[test]
    fn endpoint_joins_base_url() {
        assert_eq!(
            OpenAiClient::new(&config()).endpoint,
            "http://localhost:1/v1/chat/completions"
        );
    }

    #[test]
    fn request_has_single_user_message() {
        let body = OpenAiClient::new(&config()).request_body("plan it").unwrap();
        assert_eq!(
            body,
            json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "plan it"}]
            })
        );
    }

    #[test]
    fn reply_is_first_choice_content() {
        let body = json!({
            "choices": [
                {"message": {"role": "assistant", "content": "1) Verify price."}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        });
        assert_eq!(parse_reply(body).unwrap(), "1) Verify price.");
    }

    #[test]
    fn empty_choices_is_error() {
        assert!(matches!(
            parse_reply(json!({"choices": []})),
            Err(ServiceError::Empty)
        ));
        assert!(matches!(
            parse_reply(json!({"choices": [{"message": {"content": null}}]})),
            Err(ServiceError::Empty)
        ));
    }

    #[test]
    fn unreachable_server_is_error() {
        let client = OpenAiClient::new(&config());
        let call = LlmCall {
            step: "planner",
            prompt: "hi",
        };
        assert!(client.complete(&call, &NoopSink).is_err());
    }
}

//! Decision oracle backed by the OpenAI Responses API

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::messages::{
    tool_definitions, DecisionKind, OracleReply, OracleRequest, ResponsesApiResponse, ToolCall,
};
use crate::common::errors::{AgentError, Result};
use crate::common::traits::DecisionOracle;
use crate::config::types::OpenAiConfig;

/// LLM oracle speaking the `/responses` endpoint
#[derive(Debug, Clone)]
pub struct OpenAiOracle {
    client: Client,
    config: OpenAiConfig,
    api_key: String,
}

impl OpenAiOracle {
    pub fn new(config: OpenAiConfig, timeout: Duration) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AgentError::Configuration("openai.api_key (OPENAI_API_KEY) is required".to_string())
            })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Request body for one oracle question
    pub fn request_body(&self, request: &OracleRequest) -> Value {
        let mut content = vec![json!({"type": "input_text", "text": request.prompt})];
        if let Some(image) = &request.image_base64 {
            content.push(json!({
                "type": "input_image",
                "image_url": format!("data:image/png;base64,{}", image),
            }));
        }

        let effort = if request.kind.is_selection() {
            &self.config.selection_effort
        } else {
            &self.config.decision_effort
        };

        let mut body = json!({
            "model": self.config.model,
            "input": [{"role": "user", "content": content}],
            "reasoning": {"effort": effort},
        });

        if let Some(tool) = request.kind.forced_tool() {
            body["tools"] = tool_definitions();
            body["tool_choice"] = json!({"type": "function", "name": tool});
        } else if request.kind == DecisionKind::Opinion && self.config.web_search {
            body["tools"] = json!([{"type": "web_search"}]);
        }

        body
    }

    fn interpret(kind: DecisionKind, response: &ResponsesApiResponse) -> Result<OracleReply> {
        match kind.forced_tool() {
            Some(expected) => {
                let (name, arguments) = response.first_function_call().ok_or_else(|| {
                    AgentError::MalformedOracleResponse(format!(
                        "no function call in reply, expected {}",
                        expected
                    ))
                })?;
                if name != expected {
                    return Err(AgentError::MalformedOracleResponse(format!(
                        "called {} instead of {}",
                        name, expected
                    )));
                }
                Ok(OracleReply::ToolCall(ToolCall::parse(name, arguments)?))
            }
            None => {
                let text = response.output_text();
                if text.trim().is_empty() {
                    return Err(AgentError::MalformedOracleResponse(
                        "reply carried no text".to_string(),
                    ));
                }
                Ok(OracleReply::Text(text))
            }
        }
    }
}

#[async_trait]
impl DecisionOracle for OpenAiOracle {
    #[instrument(skip(self, request), fields(kind = ?request.kind, model = %self.config.model))]
    async fn propose(&self, request: &OracleRequest) -> Result<OracleReply> {
        let url = format!("{}/responses", self.config.base_url.trim_end_matches('/'));
        let body = self.request_body(request);
        info!("Calling LLM at {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::UpstreamUnavailable(format!("LLM request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AgentError::UpstreamUnavailable(format!(
                "LLM API returned status {}: {}",
                status, text
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AgentError::UpstreamUnavailable(format!("LLM body unreadable: {}", e)))?;
        debug!("LLM raw reply: {}", text);

        let parsed: ResponsesApiResponse = serde_json::from_str(&text)
            .map_err(|e| AgentError::MalformedOracleResponse(format!("unparseable reply: {}", e)))?;

        Self::interpret(request.kind, &parsed)
    }
}

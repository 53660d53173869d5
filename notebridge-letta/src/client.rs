use async_trait::async_trait;
use notebridge_core::{AgentBackend, GatewayError};
use reqwest::header::{ACCEPT, LOCATION};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::Instrument;

use crate::types::{agent_id_from_body, agent_id_from_location, assistant_text, MessageRequest};
use crate::{LettaConfig, LettaError};

/// HTTP client for the Letta agent platform.
///
/// Requests are sent once; failures are reported, never retried.
#[derive(Clone, Debug)]
pub struct LettaClient {
    http: Client,
    config: LettaConfig,
}

impl LettaClient {
    pub fn new(config: LettaConfig) -> Result<Self, LettaError> {
        reqwest::Url::parse(&config.api_base)
            .map_err(|err| LettaError::Config(format!("invalid api_base: {err}")))?;
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &LettaConfig {
        &self.config
    }

    /// Create an agent from the configured template and return its id.
    pub async fn create_agent_from_template(&self) -> Result<String, LettaError> {
        let api_key = self.api_key()?;
        let template = self
            .config
            .template_version
            .as_deref()
            .ok_or(LettaError::Unconfigured("LETTA_TEMPLATE_VERSION is not set"))?;

        let url = self.url(&format!(
            "/v1/templates/{}/{}/agents",
            self.config.project, template
        ));
        let response = self.post(&url, api_key, &json!({})).await?;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        let body = response.json::<Value>().await.ok();

        body.as_ref()
            .and_then(agent_id_from_body)
            .or_else(|| location.as_deref().and_then(agent_id_from_location))
            .ok_or(LettaError::MissingAgentId)
    }

    /// Send a user message to an agent and return the assistant's reply text.
    pub async fn send_user_message(
        &self,
        agent_id: &str,
        content: &str,
    ) -> Result<String, LettaError> {
        let api_key = self.api_key()?;
        let url = self.url(&format!("/v1/agents/{agent_id}/messages"));
        let response = self
            .post(&url, api_key, &MessageRequest::user(content))
            .await?;

        let body = response
            .json::<Value>()
            .await
            .map_err(|err| LettaError::Malformed(err.to_string()))?;
        assistant_text(&body)
            .ok_or_else(|| LettaError::Malformed("reply carried no assistant message".to_string()))
    }

    fn api_key(&self) -> Result<&SecretString, LettaError> {
        self.config
            .api_key
            .as_ref()
            .ok_or(LettaError::Unconfigured("LETTA_API_KEY is not set"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    async fn post<T>(
        &self,
        url: &str,
        api_key: &SecretString,
        payload: &T,
    ) -> Result<Response, LettaError>
    where
        T: Serialize + ?Sized,
    {
        let response = self
            .http
            .post(url)
            .bearer_auth(api_key.expose_secret())
            .header(ACCEPT, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    LettaError::Timeout(self.config.timeout)
                } else {
                    LettaError::Request(err)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(LettaError::Http {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl AgentBackend for LettaClient {
    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    fn can_create_agents(&self) -> bool {
        self.config.can_create_agents()
    }

    async fn create_agent(&self, notebook_id: Option<&str>) -> Result<String, GatewayError> {
        let span = tracing::info_span!(
            "letta_create_agent",
            project = %self.config.project,
            notebook_id = ?notebook_id,
        );
        let agent_id = self.create_agent_from_template().instrument(span).await?;
        Ok(agent_id)
    }

    async fn send_message(&self, agent_id: &str, content: &str) -> Result<String, GatewayError> {
        let span = tracing::info_span!(
            "letta_send_message",
            agent_id = %agent_id,
            content_bytes = content.len(),
        );
        let reply = self.send_user_message(agent_id, content).instrument(span).await?;
        Ok(reply)
    }
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::transport::{Endpoint, Transport};
use crate::config::ClientConfig;
use crate::error::TransportError;

/// JSON-over-HTTP transport to the scene backend.
///
/// No retries. A timeout applies only when configured.
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let base = config
            .api_base()
            .map_err(|e| TransportError::Url(format!("{:#}", e)))?;

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url_for(&self, endpoint: Endpoint) -> Result<Url, TransportError> {
        self.base
            .join(endpoint.path())
            .map_err(|e| TransportError::Url(format!("{}: {}", endpoint.path(), e)))
    }

    /// Accept any body carrying a `status` discriminant, whatever the HTTP
    /// code; the business layer decides what a non-success status means.
    async fn read_envelope(response: reqwest::Response) -> Result<Value, TransportError> {
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<Value>(&body) {
            Ok(value) if value.get("status").is_some() => Ok(value),
            _ if !status.is_success() => Err(TransportError::Status {
                code: status.as_u16(),
                body: body.chars().take(200).collect(),
            }),
            Ok(value) => {
                warn!("Response without status discriminant from backend");
                Ok(value)
            }
            Err(e) => Err(TransportError::Decode(e.to_string())),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, endpoint: Endpoint, body: Value) -> Result<Value, TransportError> {
        let url = self.url_for(endpoint)?;
        debug!("POST {}", url);
        let response = self.client.post(url).json(&body).send().await?;
        Self::read_envelope(response).await
    }

    async fn post_file(
        &self,
        endpoint: Endpoint,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Value, TransportError> {
        let url = self.url_for(endpoint)?;
        debug!("POST {} (multipart, {} bytes)", url, bytes.len());
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        let response = self.client.post(url).multipart(form).send().await?;
        Self::read_envelope(response).await
    }
}

use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    config::RelayConfig, envelope::UpstreamEnvelope, error::RelayError, features,
    types::RelayRequest,
};

/// Forwards feature payloads to the upstream prediction endpoint.
///
/// Holds no per-request state; one instance is shared by every handler.
pub struct Relay {
    endpoint: String,
    client: Client,
}

impl Relay {
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Parses a raw inbound body and relays it.
    pub async fn handle(&self, raw: &[u8]) -> Result<Value, RelayError> {
        let request: RelayRequest = serde_json::from_slice(raw).map_err(RelayError::Request)?;

        for advisory in features::inspect(&request.data) {
            warn!(%advisory, "feature payload advisory");
        }

        self.relay(&request).await
    }

    /// One POST of `request.data` to the endpoint, then envelope unwrap. No retries.
    pub async fn relay(&self, request: &RelayRequest) -> Result<Value, RelayError> {
        debug!(data = %request.data, "request data");
        info!(endpoint = %self.endpoint, "calling prediction endpoint");

        let start = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request.data)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        info!(
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "upstream responded"
        );
        debug!(body = %text, "upstream response body");

        if !status.is_success() {
            return Err(RelayError::Upstream { status, body: text });
        }

        let envelope = UpstreamEnvelope::parse(&text)?;
        if let UpstreamEnvelope::Lambda {
            status_code: Some(code),
            ..
        } = &envelope
        {
            if !(200..300).contains(code) {
                warn!(status_code = *code, "envelope reports a non-2xx statusCode");
            }
        }

        let prediction = envelope.into_prediction()?;
        debug!(prediction = %prediction, "parsed prediction");
        Ok(prediction)
    }
}

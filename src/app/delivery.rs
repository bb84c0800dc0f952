use crate::app::ports::{IngestRequest, IngestTransport};
use crate::batch::OutboundBatch;
use crate::config::{ForwarderConfig, RetryPolicy};
use crate::constants::{JSON_CONTENT_TYPE, SERVER_HOST, SERVER_HOST_HEADER};
use crate::error::{AttemptError, ForwarderError, Result};
use crate::infra::http_client::ReqwestTransport;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Posts outbound batches to the ingestion endpoint with bounded retry.
pub struct DeliveryClient {
    endpoint: String,
    api_key: String,
    retry: RetryPolicy,
    transport: Arc<dyn IngestTransport>,
}

impl DeliveryClient {
    /// Client backed by `reqwest`
    pub fn new(config: &ForwarderConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.request_timeout())?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(
        config: &ForwarderConfig,
        transport: Arc<dyn IngestTransport>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            retry: config.retry.clone(),
            transport,
        })
    }

    pub fn build_request(&self, batch: &OutboundBatch) -> Result<IngestRequest> {
        let body = serde_json::to_vec(batch)?;
        Ok(IngestRequest {
            url: self.endpoint.clone(),
            headers: vec![
                ("Authorization".to_string(), format!("Bearer {}", self.api_key)),
                ("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()),
                (SERVER_HOST_HEADER.to_string(), SERVER_HOST.to_string()),
            ],
            body,
        })
    }

    /// Deliver the batch, returning the parsed response body of the first
    /// attempt answered with status 200.
    ///
    /// A 200 whose body is not JSON fails with `InvalidResponse` and is not
    /// retried.
    #[instrument(skip_all, fields(session = %batch.session_id, events = batch.len()))]
    pub async fn deliver(&self, batch: &OutboundBatch) -> Result<Value> {
        let request = self.build_request(batch)?;
        info!(
            "Formatted events data to send: {}",
            String::from_utf8_lossy(&request.body)
        );

        let max_attempts = self.retry.max_attempts.max(1);
        let mut waits = self.retry.wait_schedule().into_iter();
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            crate::metrics::delivery::attempt();
            match self.send_once(&request, attempt).await {
                Ok(text) => {
                    let body = parse_response_body(&text)?;
                    info!("API response on attempt {}: {}", attempt, body);
                    if let Some(status) = body.get("status").and_then(Value::as_str) {
                        if status != "success" {
                            warn!("Ingestion API answered 200 with status '{}'", status);
                        }
                    }
                    crate::metrics::delivery::batch_delivered(batch.len(), attempt);
                    info!("Final response from ingestion API: {}", body);
                    return Ok(body);
                }
                Err(e) => {
                    crate::metrics::delivery::attempt_failed(match e {
                        AttemptError::Transport(_) => "transport",
                        AttemptError::HttpStatus { .. } => "http_status",
                    });
                    last_error = Some(e);
                }
            }

            if attempt < max_attempts {
                if let Some(wait) = waits.next() {
                    debug!("Waiting {:?} before attempt {}", wait, attempt + 1);
                    tokio::time::sleep(wait).await;
                }
            }
        }

        crate::metrics::delivery::exhausted();
        let last_error = last_error
            .unwrap_or_else(|| AttemptError::Transport("no attempt was made".to_string()));
        error!(
            "Failed to send data after {} attempts; last error: {}",
            max_attempts, last_error
        );
        Err(ForwarderError::DeliveryExhausted {
            attempts: max_attempts,
            last_error,
        })
    }

    /// One POST. Only status 200 counts; its raw body is returned.
    async fn send_once(
        &self,
        request: &IngestRequest,
        attempt: u32,
    ) -> std::result::Result<String, AttemptError> {
        let response = self.transport.post(request).await.map_err(|e| {
            warn!("Transport error on attempt {}: {}", attempt, e);
            AttemptError::Transport(e)
        })?;

        if response.status != 200 {
            warn!(
                "HTTP error on attempt {}: status {}, body: {}",
                attempt, response.status, response.body
            );
            return Err(AttemptError::HttpStatus {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response.body)
    }
}

fn parse_response_body(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| {
        error!("Response body is not JSON: {}", text);
        ForwarderError::InvalidResponse {
            status: 200,
            reason: e.to_string(),
        }
    })
}

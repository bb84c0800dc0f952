use crate::app::delivery::DeliveryClient;
use crate::batch::{assemble, OutboundBatch};
use crate::config::ForwarderConfig;
use crate::error::Result;
use crate::normalize::normalize_batch;
use crate::types::{HandlerOutcome, RawRecord, SnsEvent};
use tracing::{error, info, instrument};

/// Entry point for one trigger invocation: decode, normalize, assemble, deliver.
pub struct Handler {
    delivery: DeliveryClient,
}

impl Handler {
    pub fn new(delivery: DeliveryClient) -> Self {
        Self { delivery }
    }

    pub fn from_config(config: &ForwarderConfig) -> Result<Self> {
        Ok(Self::new(DeliveryClient::new(config)?))
    }

    /// Handle one SNS delivery batch. Any failure aborts the whole invocation
    /// and is returned to the caller after being logged.
    #[instrument(skip_all, fields(records = event.records.len()))]
    pub async fn handle(&self, event: &SnsEvent) -> Result<HandlerOutcome> {
        let result = match prepare(event) {
            Ok(batch) => self.deliver_prepared(batch).await,
            Err(e) => Err(e),
        };
        log_failure(result)
    }

    /// Same as `handle` for records that are already decoded.
    #[instrument(skip_all, fields(records = records.len()))]
    pub async fn handle_records(&self, records: Vec<RawRecord>) -> Result<HandlerOutcome> {
        let result = match prepare_records(records) {
            Ok(batch) => self.deliver_prepared(batch).await,
            Err(e) => Err(e),
        };
        log_failure(result)
    }

    async fn deliver_prepared(&self, batch: Option<OutboundBatch>) -> Result<HandlerOutcome> {
        match batch {
            Some(batch) => {
                self.delivery.deliver(&batch).await?;
            }
            None => info!("No events to send."),
        }
        Ok(HandlerOutcome::success())
    }
}

/// Decode and normalize an SNS event into the batch that would be sent.
/// `None` when there is nothing to deliver.
pub fn prepare(event: &SnsEvent) -> Result<Option<OutboundBatch>> {
    prepare_records(event.decode_records()?)
}

pub fn prepare_records(records: Vec<RawRecord>) -> Result<Option<OutboundBatch>> {
    let events = normalize_batch(records)?;
    if events.is_empty() {
        return Ok(None);
    }
    Ok(Some(assemble(events)))
}

fn log_failure(result: Result<HandlerOutcome>) -> Result<HandlerOutcome> {
    if let Err(e) = &result {
        error!("An error occurred: {}", e);
    }
    result
}

use crate::constants::{LOGFILE, PARSER, SERVER_HOST};
use crate::normalize::NormalizedEvent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Static session metadata attached to every batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub server_host: String,
    pub logfile: String,
    pub parser: String,
}

impl Default for SessionInfo {
    fn default() -> Self {
        Self {
            server_host: SERVER_HOST.to_string(),
            logfile: LOGFILE.to_string(),
            parser: PARSER.to_string(),
        }
    }
}

/// The single document posted to the ingestion endpoint per invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundBatch {
    #[serde(rename = "session")]
    pub session_id: Uuid,

    #[serde(rename = "sessionInfo")]
    pub session_info: SessionInfo,

    pub events: Vec<NormalizedEvent>,
}

impl OutboundBatch {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

/// Wrap events in a fresh session. Order is kept as given.
pub fn assemble(events: Vec<NormalizedEvent>) -> OutboundBatch {
    OutboundBatch {
        session_id: Uuid::new_v4(),
        session_info: SessionInfo::default(),
        events,
    }
}

use crate::constants::{SUCCESS_MESSAGE, SUCCESS_STATUS_CODE};
use crate::error::{ForwarderError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One decoded notification message. Forwarded opaquely, key order preserved.
pub type RawRecord = serde_json::Map<String, Value>;

/// Batch of SNS notifications as handed over by the trigger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnsEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<SnsEventRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnsEventRecord {
    #[serde(rename = "EventSource", default, skip_serializing_if = "Option::is_none")]
    pub event_source: Option<String>,

    #[serde(rename = "Sns")]
    pub sns: SnsMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SnsMessage {
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_arn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl SnsEventRecord {
    /// Decode the JSON text carried in `Sns.Message` into a raw record.
    pub fn decode_message(&self) -> Result<RawRecord> {
        match serde_json::from_str::<Value>(&self.sns.message)? {
            Value::Object(map) => Ok(map),
            other => Err(ForwarderError::InvalidRecord(format!(
                "SNS message {} is not a JSON object (got {})",
                self.sns.message_id.as_deref().unwrap_or("<unknown>"),
                json_kind(&other)
            ))),
        }
    }
}

impl SnsEvent {
    pub fn decode_records(&self) -> Result<Vec<RawRecord>> {
        self.records.iter().map(SnsEventRecord::decode_message).collect()
    }
}

/// Result reported back to the invoking runtime on success
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerOutcome {
    pub status_code: u16,
    pub body: String,
}

impl HandlerOutcome {
    pub fn success() -> Self {
        Self {
            status_code: SUCCESS_STATUS_CODE,
            // The body is itself JSON text, as the runtime expects
            body: Value::String(SUCCESS_MESSAGE.to_string()).to_string(),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

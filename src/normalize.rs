use crate::constants::{TIMESTAMP_FIELD, TIMESTAMP_PARENTS};
use crate::error::{ForwarderError, Result};
use crate::time::resolve_timestamp_ns;
use crate::types::RawRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

/// A raw record stamped with its resolved event time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    #[serde(rename = "ts")]
    pub timestamp_ns: i64,

    /// The entire raw record, untouched
    #[serde(rename = "attrs")]
    pub attributes: RawRecord,
}

/// Find the source timestamp, checking `mail.timestamp` then `open.timestamp`.
///
/// Missing, `null` and empty values fall through to the next location, as does
/// a parent that is not an object. A value of any other non-string type,
/// including `0` and `false`, is rejected.
pub fn extract_candidate_timestamp(record: &RawRecord) -> Result<Option<&str>> {
    for parent in TIMESTAMP_PARENTS {
        let candidate = record
            .get(parent)
            .and_then(Value::as_object)
            .and_then(|section| section.get(TIMESTAMP_FIELD));

        match candidate {
            None | Some(Value::Null) => continue,
            Some(Value::String(text)) if text.is_empty() => continue,
            Some(Value::String(text)) => return Ok(Some(text.as_str())),
            Some(other) => {
                return Err(ForwarderError::TimestampParse {
                    value: other.to_string(),
                    reason: format!("{}.{} is not a string", parent, TIMESTAMP_FIELD),
                })
            }
        }
    }
    Ok(None)
}

/// Normalize one raw record into a timestamped event.
pub fn normalize_record(record: RawRecord) -> Result<NormalizedEvent> {
    let raw = Value::Object(record.clone());
    info!("Received raw SNS message: {}", raw);

    let candidate = extract_candidate_timestamp(&record).map_err(|e| {
        crate::metrics::normalize::record_rejected();
        e
    })?;

    let timestamp_ns = match candidate {
        Some(text) => {
            let ns = resolve_timestamp_ns(Some(text)).map_err(|e| {
                warn!("Rejecting record with unusable timestamp '{}': {}", text, e);
                crate::metrics::normalize::record_rejected();
                e
            })?;
            debug!("Using source timestamp {} -> {}", text, ns);
            ns
        }
        None => {
            let ns = resolve_timestamp_ns(None)?;
            debug!("No source timestamp; using current time {}", ns);
            crate::metrics::normalize::timestamp_fallback();
            ns
        }
    };

    crate::metrics::normalize::event_normalized();
    Ok(NormalizedEvent {
        timestamp_ns,
        attributes: record,
    })
}

/// Normalize records in order. The first failure aborts the whole batch.
pub fn normalize_batch(records: Vec<RawRecord>) -> Result<Vec<NormalizedEvent>> {
    records.into_iter().map(normalize_record).collect()
}

use async_trait::async_trait;

/// Outbound POST as handed to a transport
#[derive(Clone, Debug)]
pub struct IngestRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl IngestRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct IngestResponse {
    pub status: u16,
    pub body: String,
}

/// One HTTP round trip to the ingestion endpoint. `Err` means no response was
/// received (connection, DNS, timeout); any status code is an `Ok`.
#[async_trait]
pub trait IngestTransport: Send + Sync {
    async fn post(&self, request: &IngestRequest) -> Result<IngestResponse, String>;
}

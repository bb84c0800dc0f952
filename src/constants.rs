//! Fixed values sent with every outbound batch and returned to the runtime.

// Session metadata
pub const SERVER_HOST: &str = "AWS_SNS";
pub const LOGFILE: &str = "lambda_logs";
pub const PARSER: &str = "lambda-parser";

// Request headers
pub const SERVER_HOST_HEADER: &str = "server-host";
pub const JSON_CONTENT_TYPE: &str = "application/json";

// Handler outcome
pub const SUCCESS_STATUS_CODE: u16 = 200;
pub const SUCCESS_MESSAGE: &str = "Successfully processed SNS message.";

// Environment variables
pub const API_KEY_ENV: &str = "SCALYR_API_KEY";
pub const ENDPOINT_ENV: &str = "SCALYR_ENDPOINT";
pub const MAX_ATTEMPTS_ENV: &str = "FORWARDER_MAX_ATTEMPTS";
pub const INITIAL_WAIT_MS_ENV: &str = "FORWARDER_INITIAL_WAIT_MS";
pub const BACKOFF_FACTOR_ENV: &str = "FORWARDER_BACKOFF_FACTOR";
pub const REQUEST_TIMEOUT_SECS_ENV: &str = "FORWARDER_REQUEST_TIMEOUT_SECS";
pub const LOG_JSON_ENV: &str = "FORWARDER_LOG_JSON";
pub const LOG_DIR_ENV: &str = "FORWARDER_LOG_DIR";

// Retry defaults
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_WAIT_MS: u64 = 1000;
pub const DEFAULT_BACKOFF_FACTOR: f64 = 1.5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Timestamp locations inside a raw record, checked in order
pub const TIMESTAMP_PARENTS: [&str; 2] = ["mail", "open"];
pub const TIMESTAMP_FIELD: &str = "timestamp";

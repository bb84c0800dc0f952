pub mod batch;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod time;
pub mod types;

// Application layer (handler, delivery, ports) and infrastructure adapters
pub mod app;
pub mod infra;

pub use app::delivery::DeliveryClient;
pub use app::handler::Handler;
pub use config::{ForwarderConfig, RetryPolicy};
pub use error::{AttemptError, ForwarderError, Result};
pub use types::{HandlerOutcome, RawRecord, SnsEvent};

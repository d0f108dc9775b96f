pub mod error;
pub mod fs;
pub mod pipeline;
pub mod proxy;
pub mod retry;
pub mod stock;
mod tui;

pub use error::{FetchError, PipelineError, ProxyError};
pub use pipeline::{Pipeline, PipelineConfig, RunSummary};
pub use proxy::{ClientConfig, ProxyClient, RequestClient, Response};
pub use retry::{Backoff, RetryPolicy};

/// Shortcut for required API elements.
pub(crate) mod http {
    pub(crate) use reqwest::Client as HttpClient;
    pub(crate) use reqwest::StatusCode;
}

/// Format the time elapsed since `time`, for trailing a log message.
pub(crate) fn time_elapsed(time: std::time::Instant) -> String {
    format!(
        "\x1b[38;5;208melapsed time: {} ms\x1b[0m",
        time.elapsed().as_millis()
    )
}

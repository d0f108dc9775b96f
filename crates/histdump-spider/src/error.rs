use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors; any of these aborts the whole run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("ticker file not found at \"{}\"", .0.display())]
    BadTickerFile(PathBuf),

    #[error("invalid table marker selector \"{0}\"")]
    BadMarker(String),

    #[error("cannot create directory \"{}\", error({source})", .path.display())]
    CannotCreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read ticker file \"{}\", error({source})", .path.display())]
    ReadTickers {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by a [`RequestClient`] itself, as opposed to a transient
/// lack of response.
///
/// [`RequestClient`]: crate::proxy::RequestClient
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid proxy \"{url}\", error({source})")]
    InvalidProxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build http client, error({0})")]
    Build(#[source] reqwest::Error),

    #[error("request failed, error({0})")]
    Request(#[source] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// Per-ticker failures; logged, collected into the run summary, never fatal.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for [{ticker}] failed, error({source})")]
    Request {
        ticker: String,
        #[source]
        source: ProxyError,
    },

    #[error("[{ticker}] is not a valid ticker; it cannot name an output file")]
    InvalidTicker { ticker: String },

    #[error("no valid response for [{ticker}] after {attempts} attempts")]
    Exhausted { ticker: String, attempts: u32 },

    #[error("failed to write \"{}\" for [{ticker}], error({source})", .path.display())]
    Write {
        ticker: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// The ticker symbol the failure belongs to.
    pub fn ticker(&self) -> &str {
        match self {
            Self::InvalidTicker { ticker } => ticker,
            Self::Request { ticker, .. } => ticker,
            Self::Exhausted { ticker, .. } => ticker,
            Self::Write { ticker, .. } => ticker,
        }
    }
}

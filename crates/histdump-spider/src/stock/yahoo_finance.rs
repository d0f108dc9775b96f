use super::page::{parse_rows, HeaderSkip, RowLocator};
use super::schema::{extract, Ticker};
use crate::error::FetchError;
use crate::fs::{write_json, OutputLayout};
use crate::proxy::{RequestClient, Response};
use crate::retry::RetryPolicy;
use std::path::PathBuf;
use tracing::{debug, error, trace, warn};

pub const BASE_URL: &str = "https://finance.yahoo.com";

/// `<base_url>/quote/<TICKER>/history/`
pub fn history_url(base_url: &str, ticker: &Ticker) -> String {
    format!(
        "{}/quote/{}/history/",
        base_url.trim_end_matches('/'),
        urlencoding::encode(ticker.as_str())
    )
}

/// What one successfully scraped ticker produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerReport {
    pub ticker: Ticker,
    pub prices: usize,
    pub dividends: usize,
    pub attempts: u32,
}

/// Scrapes one ticker at a time: fetch with retry, parse, classify, write.
///
/// Holds no per-ticker state, so a single instance is shared by every worker.
pub struct HistoryScraper {
    base_url: String,
    retry: RetryPolicy,
    locator: Box<dyn RowLocator>,
    layout: OutputLayout,
}

impl HistoryScraper {
    pub fn new(layout: OutputLayout) -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            retry: RetryPolicy::default(),
            locator: Box::new(HeaderSkip::default()),
            layout,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_locator(mut self, locator: impl RowLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Process `ticker` end to end. Nothing is written unless the page was
    /// fetched; a failure here never affects any other ticker.
    pub async fn scrape<C>(&self, client: &C, ticker: &Ticker) -> Result<TickerReport, FetchError>
    where
        C: RequestClient,
    {
        let time = std::time::Instant::now();
        if !ticker.is_file_safe() {
            error!("[{ticker}] cannot be written under the output root; skipping");
            return Err(FetchError::InvalidTicker {
                ticker: ticker.to_string(),
            });
        }
        let (response, attempts) = self.fetch(client, ticker).await?;

        // parsing is synchronous; the document is dropped before the writes
        let rows = parse_rows(&response.text, &*self.locator);
        trace!("{} rows found for [{ticker}]", rows.len());
        let extracted = extract(rows);

        let history_path = self.layout.history_path(ticker);
        write_json(&history_path, &extracted.prices)
            .await
            .map_err(|source| write_error(ticker, history_path.clone(), source))?;

        // a ticker either has both files or neither
        let dividend_path = self.layout.dividend_path(ticker);
        if let Err(source) = write_json(&dividend_path, &extracted.dividends).await {
            if let Err(err) = tokio::fs::remove_file(&history_path).await {
                warn!("failed to remove {history_path:?} for [{ticker}], error({err})");
            }
            return Err(write_error(ticker, dividend_path, source));
        }

        debug!(
            "[{ticker}] {} prices, {} dividends written. {}",
            extracted.prices.0.len(),
            extracted.dividends.0.len(),
            crate::time_elapsed(time)
        );

        Ok(TickerReport {
            ticker: ticker.clone(),
            prices: extracted.prices.0.len(),
            dividends: extracted.dividends.0.len(),
            attempts,
        })
    }

    /// GET the history page until it answers `200 OK`, the retry budget is
    /// spent, or the client errors; returns the response and attempts used.
    pub async fn fetch<C>(&self, client: &C, ticker: &Ticker) -> Result<(Response, u32), FetchError>
    where
        C: RequestClient,
    {
        let url = history_url(&self.base_url, ticker);
        let mut attempts = 0;

        loop {
            attempts += 1;
            match client.get(&url).await {
                Ok(Some(response)) if response.is_ok() => {
                    trace!("[{ticker}] fetched on attempt {attempts}");
                    return Ok((response, attempts));
                }
                Ok(Some(response)) => {
                    debug!(
                        "[{ticker}] responded with status {}, attempt {attempts}",
                        response.status
                    )
                }
                Ok(None) => debug!("no response for [{ticker}], attempt {attempts}"),
                Err(source) => {
                    error!("failed to fetch [{ticker}], error({source})");
                    return Err(FetchError::Request {
                        ticker: ticker.to_string(),
                        source,
                    });
                }
            }

            if !self.retry.can_retry(attempts) {
                warn!("giving up on [{ticker}] after {attempts} attempts");
                return Err(FetchError::Exhausted {
                    ticker: ticker.to_string(),
                    attempts,
                });
            }
            tokio::time::sleep(self.retry.delay_for_attempt(attempts - 1)).await;
        }
    }
}

fn write_error(ticker: &Ticker, path: PathBuf, source: std::io::Error) -> FetchError {
    error!("failed to write {path:?} for [{ticker}], error({source})");
    FetchError::Write {
        ticker: ticker.to_string(),
        path,
        source,
    }
}

use crate::error::{FetchError, PipelineError};
use crate::fs::{read_tickers, OutputLayout};
use crate::proxy::RequestClient;
use crate::retry::RetryPolicy;
use crate::stock::page::{RowLocator, TableMarker};
use crate::stock::yahoo_finance::{HistoryScraper, TickerReport, BASE_URL};
use crate::tui::RunProgress;
use futures::{stream, StreamExt};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const DEFAULT_TICKER_FILE: &str = "./stock_list.txt";
pub const DEFAULT_OUTPUT_DIR: &str = "./historical_stock_data";
pub const DEFAULT_THREADS: usize = 10;
pub const MAX_THREADS: usize = 200;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// One ticker symbol per line.
    pub ticker_file: PathBuf,
    /// Output root; dividends go to its `dividend_history` subdirectory.
    pub output_dir: PathBuf,
    /// Maximum number of tickers in flight, clamped to `1..=MAX_THREADS`.
    pub thread_limit: usize,
    /// Delete the output root before recreating it.
    pub clear_existing: bool,
    pub base_url: String,
    pub retry: RetryPolicy,
    /// CSS selector of the history table; `None` skips the two header rows instead.
    pub marker: Option<String>,
    /// Show progress bars instead of relying on logs.
    pub tui: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ticker_file: PathBuf::from(DEFAULT_TICKER_FILE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            thread_limit: DEFAULT_THREADS,
            clear_existing: true,
            base_url: BASE_URL.to_string(),
            retry: RetryPolicy::default(),
            marker: None,
            tui: false,
        }
    }
}

/// Reads the ticker list and scrapes every ticker through a bounded pool of
/// concurrent workers, all sharing one [`RequestClient`].
pub struct Pipeline<C> {
    client: C,
    scraper: HistoryScraper,
    ticker_file: PathBuf,
    thread_limit: usize,
    tui: bool,
}

impl<C: RequestClient> Pipeline<C> {
    /// Check the ticker file exists, then prepare the output directories.
    ///
    /// The ticker file and the marker are checked before anything on disk is touched.
    pub async fn new(config: PipelineConfig, client: C) -> Result<Self, PipelineError> {
        if !tokio::fs::try_exists(&config.ticker_file)
            .await
            .unwrap_or(false)
        {
            error!("ticker file not found: {:?}", config.ticker_file);
            return Err(PipelineError::BadTickerFile(config.ticker_file));
        }

        let marker = match config.marker {
            Some(css) => match TableMarker::new(&css) {
                Some(marker) => Some(marker),
                None => {
                    error!("invalid table marker: {css}");
                    return Err(PipelineError::BadMarker(css));
                }
            },
            None => None,
        };

        let layout = OutputLayout::new(&config.output_dir);
        if config.clear_existing {
            layout.clear().await?;
        }
        layout.setup().await?;
        debug!("output directories ready under {:?}", layout.root());

        let mut scraper = HistoryScraper::new(layout)
            .with_base_url(config.base_url)
            .with_retry(config.retry);
        if let Some(marker) = marker {
            scraper = scraper.with_locator(marker);
        }

        Ok(Self {
            client,
            scraper,
            ticker_file: config.ticker_file,
            thread_limit: config.thread_limit.clamp(1, MAX_THREADS),
            tui: config.tui,
        })
    }

    /// Swap the strategy used to find the table rows on each page.
    pub fn with_locator(mut self, locator: impl RowLocator + 'static) -> Self {
        self.scraper = self.scraper.with_locator(locator);
        self
    }

    /// Override the number of tickers in flight for this pipeline.
    pub fn with_concurrency(mut self, threads: usize) -> Self {
        self.thread_limit = threads.clamp(1, MAX_THREADS);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn output(&self) -> &OutputLayout {
        self.scraper.layout()
    }

    pub fn ticker_file(&self) -> &Path {
        &self.ticker_file
    }

    pub fn thread_limit(&self) -> usize {
        self.thread_limit
    }

    /// Scrape every ticker in the list and wait for all of them.
    ///
    /// Only fatal errors are returned; per-ticker failures are logged and
    /// collected into the [`RunSummary`].
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        let time = std::time::Instant::now();
        let tickers = read_tickers(&self.ticker_file).await.map_err(|err| {
            error!("{err}");
            err
        })?;

        info!(
            "scraping {} tickers, {} at a time ...",
            tickers.len(),
            self.thread_limit
        );
        let progress = RunProgress::new(tickers.len(), self.tui).unwrap_or_else(|err| {
            warn!("failed to build progress bars, error({err})");
            RunProgress::hidden()
        });

        let outcomes: Vec<Result<TickerReport, FetchError>> = stream::iter(tickers)
            .map(|ticker| {
                let client = &self.client;
                let scraper = &self.scraper;
                let progress = &progress;
                async move {
                    let outcome = scraper.scrape(client, &ticker).await;
                    progress.record(outcome.is_ok());
                    outcome
                }
            })
            .buffer_unordered(self.thread_limit)
            .collect()
            .await;

        progress.finish();

        let summary = RunSummary::collect(outcomes, time.elapsed());
        info!(
            "{} tickers scraped, {} failed. {}",
            summary.successes(),
            summary.failures(),
            crate::time_elapsed(time)
        );
        Ok(summary)
    }
}

/// Per-ticker outcomes of one [`Pipeline::run`], in completion order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub succeeded: Vec<TickerReport>,
    pub failed: Vec<FetchError>,
    pub elapsed: Duration,
}

impl RunSummary {
    fn collect(outcomes: Vec<Result<TickerReport, FetchError>>, elapsed: Duration) -> Self {
        let (succeeded, failed): (Vec<_>, Vec<_>) = outcomes.into_iter().partition(Result::is_ok);
        Self {
            succeeded: succeeded.into_iter().filter_map(Result::ok).collect(),
            failed: failed.into_iter().filter_map(Result::err).collect(),
            elapsed,
        }
    }

    pub fn successes(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failures(&self) -> usize {
        self.failed.len()
    }

    pub fn total(&self) -> usize {
        self.successes() + self.failures()
    }

    pub fn failed_tickers(&self) -> Vec<&str> {
        self.failed.iter().map(FetchError::ticker).collect()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} / {} tickers scraped in {:.1}s",
            self.successes(),
            self.total(),
            self.elapsed.as_secs_f64()
        )?;
        for err in &self.failed {
            writeln!(f, "  - {err}")?;
        }
        Ok(())
    }
}

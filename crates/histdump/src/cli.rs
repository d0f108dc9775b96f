use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing; without it, progress bars are shown instead.
    #[arg(short, long, global = true)]
    pub trace: Option<TraceLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrape historical prices & dividends for every ticker in the list, to JSON files.
    Fetch(FetchArgs),
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// File of ticker symbols, one per line.
    #[arg(long, default_value = "./stock_list.txt")]
    pub tickers: PathBuf,

    /// Output directory; dividends are written to its `dividend_history` subdirectory.
    #[arg(short, long, default_value = "./historical_stock_data")]
    pub output: PathBuf,

    /// Maximum number of tickers scraped at once (1 to 200).
    #[arg(long, default_value_t = 10)]
    pub threads: usize,

    /// Keep the existing output directory, rather than clearing it first.
    #[arg(long)]
    pub keep_existing: bool,

    /// Per-request timeout, in seconds.
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,

    /// File of proxy URLs, one per line.
    ///
    /// If not provided, the comma separated HISTDUMP_PROXIES variable is used;
    /// with neither, requests go direct.
    #[arg(long)]
    pub proxies: Option<PathBuf>,

    /// Attempts per ticker before giving up on it.
    #[arg(long, default_value_t = 10)]
    pub max_attempts: u32,

    /// Scheme & host the history pages are requested from.
    #[arg(long, default_value = "https://finance.yahoo.com")]
    pub base_url: String,

    /// CSS selector of the history table; by default the first two rows of the page are skipped.
    #[arg(long)]
    pub marker: Option<String>,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
#[clap(rename_all = "UPPERCASE")]
pub enum TraceLevel {
    DEBUG,
    ERROR,
    INFO,
    TRACE,
    WARN,
}

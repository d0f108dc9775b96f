mod cli;

use clap::Parser;
use cli::{Cli, Commands, FetchArgs, TraceLevel};
use colored::Colorize;
use dotenv::var;
use histdump_spider::proxy::parse_proxy_list;
use histdump_spider::{
    Backoff, ClientConfig, Pipeline, PipelineConfig, ProxyClient, RetryPolicy, RunSummary,
};
use std::time::Duration;
use tracing::{debug, error, subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;

////////////////////////////////////////////////////////////////////////////

// preproccess the trace level, and open the .env file
fn preprocess(trace_level: Option<Level>) {
    dotenv::dotenv().ok();
    if let Some(trace_level) = trace_level {
        let my_subscriber = FmtSubscriber::builder()
            .with_max_level(trace_level)
            .finish();
        subscriber::set_global_default(my_subscriber).expect("Set subscriber");
    }
}

////////////////////////////////////////////////////////////////////////////

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // set the trace level
    preprocess(cli.trace.map(|trace_level| match trace_level {
        TraceLevel::DEBUG => Level::DEBUG,
        TraceLevel::ERROR => Level::ERROR,
        TraceLevel::INFO => Level::INFO,
        TraceLevel::TRACE => Level::TRACE,
        TraceLevel::WARN => Level::WARN,
    }));
    trace!("command line input recorded: {cli:?}");

    // if no trace level provided, use tui
    let tui = cli.trace.is_none();

    match cli.command {
        // `histdump fetch [OPTIONS]`: scrape every ticker in the list
        Commands::Fetch(args) => {
            let summary = fetch(args, tui).await?;
            report(&summary);
        }
    }

    Ok(())
}

async fn fetch(args: FetchArgs, tui: bool) -> anyhow::Result<RunSummary> {
    // proxies: --proxies file, else HISTDUMP_PROXIES, else direct
    let proxies = match &args.proxies {
        Some(path) => {
            let text = tokio::fs::read_to_string(path).await.map_err(|err| {
                error!("failed to read proxy list {path:?}, error({err})");
                err
            })?;
            parse_proxy_list(&text)
        }
        None => var("HISTDUMP_PROXIES")
            .map(|list| parse_proxy_list(&list))
            .unwrap_or_default(),
    };
    debug!("{} proxies loaded", proxies.len());

    let client = ProxyClient::new(&ClientConfig {
        proxies,
        timeout: Duration::from_secs(args.timeout),
        user_agent: var("USER_AGENT").ok(),
    })?;

    let config = PipelineConfig {
        ticker_file: args.tickers,
        output_dir: args.output,
        thread_limit: args.threads,
        clear_existing: !args.keep_existing,
        base_url: args.base_url,
        retry: RetryPolicy::new(args.max_attempts, Backoff::default()),
        marker: args.marker,
        tui,
    };

    // every input is checked before the output root is cleared
    let pipeline = Pipeline::new(config, client).await?;
    Ok(pipeline.run().await?)
}

// printed in every mode; with `--trace` it follows the log output
fn report(summary: &RunSummary) {
    for line in summary_lines(summary) {
        println!("{line}");
    }
}

fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let line = format!(
        "{} / {} tickers scraped in {:.1}s",
        summary.successes(),
        summary.total(),
        summary.elapsed.as_secs_f64()
    );
    match summary.failures() {
        0 => vec![line.green().to_string()],
        _ => std::iter::once(line.yellow().to_string())
            .chain(
                summary
                    .failed
                    .iter()
                    .map(|err| format!("  {} {err}", "x".red())),
            )
            .collect(),
    }
}

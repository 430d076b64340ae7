//! Command-line front end for the StockSense analysis backend
//!
//! # Usage
//!
//! ```bash
//! # Point at a running backend (defaults to http://127.0.0.1:8000)
//! export STOCKSENSE_BACKEND_URL="http://localhost:8000"
//!
//! stocksense health
//! stocksense analyze AAPL msft brk.b
//! stocksense sentiment NVDA
//! stocksense classify --text "Sentiment: positive after earnings beat"
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use stocksense_core::{
    CachedPriceProvider, ClientConfig, HttpBackend, JobEvent, JobOrchestrator, PriceHistoryProvider,
    PriceMetrics, ResultStore, SentimentCategory, SentimentInsight, SentimentReport, Session,
    Ticker, YahooPriceProvider, classify, sentiment_insight,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Number of history entries shown after a run
const HISTORY_PREVIEW: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "stocksense")]
#[command(about = "Trigger backend stock analyses and inspect their results", long_about = None)]
struct Cli {
    /// Backend base URL (overrides STOCKSENSE_BACKEND_URL)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Skip the price metrics lookup after each analysis
    #[arg(long, global = true)]
    no_metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check whether the backend is reachable
    Health,
    /// Run a full analysis for each ticker, one after another
    Analyze {
        #[arg(required = true)]
        tickers: Vec<String>,
    },
    /// Classify the sentiment of the latest stored analysis
    Sentiment { ticker: String },
    /// Classify sentiment text offline (reads stdin when no input is given)
    Classify {
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stocksense_utils::init_tracing_with_default("warn");

    let cli = Cli::parse();

    let mut builder = ClientConfig::builder();
    if let Some(url) = &cli.backend_url {
        builder = builder.backend_url(url);
    }
    let config = builder.from_env()?.build()?;
    debug!("Using backend at {}", config.backend_url);

    match cli.command {
        Commands::Health => health(&config).await,
        Commands::Analyze { tickers } => analyze(&config, &tickers, !cli.no_metrics).await,
        Commands::Sentiment { ticker } => sentiment(&config, &ticker).await,
        Commands::Classify { text, file } => classify_input(text, file),
    }
}

async fn health(config: &ClientConfig) -> anyhow::Result<()> {
    let orchestrator = JobOrchestrator::from_config(config)?;
    let mut session = Session::new();

    if orchestrator.check_health(&mut session).await {
        println!("Backend online at {}", config.backend_url);
        Ok(())
    } else {
        anyhow::bail!("Backend offline at {}", config.backend_url)
    }
}

async fn analyze(config: &ClientConfig, tickers: &[String], with_metrics: bool) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let orchestrator = JobOrchestrator::from_config(config)?.with_events(tx);
    let prices = CachedPriceProvider::new(YahooPriceProvider::new(), config.price_cache_ttl);
    let mut session = Session::new();

    let progress = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                JobEvent::Attempt { ticker, attempt, total } => {
                    eprintln!("  {ticker}: checking for results ({attempt}/{total})");
                }
                JobEvent::State { ticker, state } => debug!("{} -> {:?}", ticker, state),
            }
        }
    });

    for raw in tickers {
        let ticker = match Ticker::parse(raw) {
            Ok(ticker) => ticker,
            Err(e) => {
                eprintln!("{raw}: {e}");
                continue;
            }
        };

        println!("Analyzing {ticker}...");
        let result = match orchestrator.run(&mut session, &ticker).await {
            Ok(result) => result,
            Err(e) => {
                eprintln!("{ticker}: {}", e.user_message());
                continue;
            }
        };

        println!("\n== {} ==", result.label());
        println!("{}", result.data.summary().unwrap_or("No summary available"));

        if let Some(raw_report) = result.data.sentiment_report() {
            println!("\nSentiment");
            print_report(&classify(raw_report));
        }

        if with_metrics {
            print_metrics(&prices, &ticker, config).await;
        }
        println!();
    }

    drop(orchestrator);
    progress.await.context("progress printer panicked")?;

    print_history(session.history());
    info!("Session {} finished", session.id());
    Ok(())
}

async fn sentiment(config: &ClientConfig, raw: &str) -> anyhow::Result<()> {
    let ticker = Ticker::parse(raw)?;
    let backend = HttpBackend::new(config)?;

    match sentiment_insight(&backend, &ticker).await {
        SentimentInsight::Available { ticker, report } => {
            println!("Sentiment for {ticker}");
            print_report(&report);
        }
        SentimentInsight::Unavailable { ticker, reason } => {
            println!("Sentiment for {ticker} unavailable: {reason}");
        }
    }
    Ok(())
}

fn classify_input(text: Option<String>, file: Option<PathBuf>) -> anyhow::Result<()> {
    let text = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    print_report(&classify(&Value::String(text)));
    Ok(())
}

fn print_report(report: &SentimentReport) {
    match report {
        SentimentReport::Structured(items) => {
            for item in items {
                println!("- [{}] {}", item.sentiment_or_na(), item.headline_or_na());
                println!("    {}", item.justification_or_na());
            }
        }
        SentimentReport::Distribution(dist) => {
            let total = dist.total();
            for (category, count) in dist.iter() {
                let share = f64::from(count) / f64::from(total) * 100.0;
                println!("  {category:<8} {count:>3} ({share:.0}%)");
            }
            let dominant = dist.dominant();
            let verdict = match dominant {
                SentimentCategory::Positive => "leaning positive",
                SentimentCategory::Negative => "leaning negative",
                SentimentCategory::Neutral => "mostly neutral",
            };
            println!("  Overall: {dominant} ({verdict})");
        }
    }
}

async fn print_metrics(
    prices: &CachedPriceProvider<YahooPriceProvider>,
    ticker: &Ticker,
    config: &ClientConfig,
) {
    let points = match prices.price_history(ticker, config.metrics_period).await {
        Ok(points) => points,
        Err(e) => {
            eprintln!("  Price data unavailable: {e}");
            return;
        }
    };

    let Some(metrics) = PriceMetrics::from_series(&points) else {
        println!("\nNo price data for {ticker}");
        return;
    };

    let arrow = if metrics.is_up() { "+" } else { "" };
    println!("\nKey metrics ({})", config.metrics_period);
    println!(
        "  Price      ${:.2} ({arrow}{:.2}%)",
        metrics.current_price, metrics.change_percent
    );
    println!("  High       ${:.2}", metrics.period_high);
    println!("  Low        ${:.2}", metrics.period_low);
    println!("  Volatility {:.2}%", metrics.volatility_percent);
}

fn print_history(history: &ResultStore) {
    if history.is_empty() {
        println!("No analyses recorded this session.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["#", "Ticker", "Retrieved", "Summary"]);

    for (index, result) in history.recent(HISTORY_PREVIEW).enumerate() {
        let summary = result.data.summary().unwrap_or("-");
        let preview: String = summary.chars().take(60).collect();
        table.add_row(vec![
            (index + 1).to_string(),
            result.ticker.to_string(),
            result.observed_at.format("%m/%d %H:%M").to_string(),
            preview,
        ]);
    }

    println!("Recent analyses");
    println!("{table}");
}

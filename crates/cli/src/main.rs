mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::FileConfig;
use sniper_api::AppState;
use sniper_brokers_common::SimulatedBrokerFactory;
use sniper_brokers_deriv::DerivClientFactory;
use sniper_core::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "sniper")]
#[command(about = "Binary-options signal dashboard backed by the Deriv API")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Optional TOML config file with [dashboard] and [deriv] sections
    #[arg(short, long, env = "SNIPER_CONFIG")]
    config: Option<PathBuf>,

    /// Use the offline simulated broker instead of Deriv
    #[arg(long)]
    simulated: bool,

    /// Deriv application id (overrides the config file)
    #[arg(long, env = "DERIV_APP_ID")]
    app_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard server
    Serve {
        /// Bind address (overrides the config file)
        #[arg(short, long, env = "SNIPER_BIND")]
        bind: Option<String>,

        /// Poll interval for the browser page, in milliseconds
        #[arg(long)]
        poll_interval_ms: Option<u64>,
    },

    /// Connect once, compute a single signal and print it
    Signal {
        /// API token
        #[arg(short, long, env = "DERIV_TOKEN")]
        token: Option<String>,

        /// Market symbol (e.g. "R_100", "frxEURUSD")
        #[arg(short, long)]
        symbol: Option<String>,

        /// Candle timeframe (e.g. "1m", "5m", "300")
        #[arg(long)]
        timeframe: Option<String>,

        /// Strategy id (see `sniper strategies`)
        #[arg(long)]
        strategy: Option<String>,
    },

    /// List available strategies
    Strategies,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    if let Some(app_id) = cli.app_id.clone() {
        file_config.deriv.app_id = app_id;
    }

    let factory: Arc<dyn BrokerFactory> = if cli.simulated {
        Arc::new(SimulatedBrokerFactory::default())
    } else {
        Arc::new(DerivClientFactory::new(file_config.deriv.clone()))
    };

    match cli.command {
        Commands::Serve {
            bind,
            poll_interval_ms,
        } => {
            let mut dashboard = file_config.dashboard;
            if let Some(bind) = bind {
                dashboard.bind = bind;
            }
            if let Some(interval) = poll_interval_ms {
                dashboard.poll_interval_ms = interval;
            }
            tracing::info!(
                broker = factory.name(),
                bind = %dashboard.bind,
                poll_interval_ms = dashboard.poll_interval_ms,
                "Starting dashboard"
            );
            let bind = dashboard.bind.clone();
            let state = Arc::new(AppState::with_defaults(dashboard, factory));
            sniper_api::start_server(state, &bind).await?;
        }
        Commands::Signal {
            token,
            symbol,
            timeframe,
            strategy,
        } => {
            let token = match token {
                Some(token) => token,
                None if cli.simulated => "demo".to_string(),
                None => bail!("an API token is required (--token or DERIV_TOKEN)"),
            };
            let dashboard = file_config.dashboard;
            run_signal(
                factory.as_ref(),
                &token,
                symbol.unwrap_or(dashboard.default_symbol),
                timeframe.unwrap_or(dashboard.default_timeframe),
                strategy.unwrap_or(dashboard.default_strategy),
                dashboard.candle_count,
            )
            .await?;
        }
        Commands::Strategies => {
            println!("Available strategies:");
            for generator in sniper_strategies::catalogue() {
                println!(
                    "  {:<8} - {} (needs {} candles)",
                    generator.id(),
                    generator.description(),
                    generator.min_candles()
                );
            }
        }
    }

    Ok(())
}

async fn run_signal(
    factory: &dyn BrokerFactory,
    token: &str,
    symbol: String,
    timeframe: String,
    strategy: String,
    candle_count: usize,
) -> Result<()> {
    let timeframe = timeframe.parse::<Timeframe>()?;
    let generator = sniper_strategies::catalogue()
        .into_iter()
        .find(|g| g.id() == strategy)
        .with_context(|| format!("unknown strategy '{}'", strategy))?;

    let mut client = factory.create(token);
    let account = client.start().await?;
    tracing::info!(
        login_id = %account.login_id,
        account_type = %account.account_type,
        "Authorized"
    );

    let count = candle_count.max(generator.min_candles());
    let candles = client.candles(&symbol, timeframe, count).await;
    if let Err(e) = client.disconnect().await {
        tracing::warn!(error = %e, "Error while closing broker client");
    }
    let candles = candles?;
    let signal = generator.generate(&candles)?;

    let entry = candles.last().map(|c| c.timestamp + timeframe.duration());

    let sep = "=".repeat(60);
    println!("\n{sep}");
    println!("  SIGNAL  {} {}", symbol, timeframe);
    println!("{sep}");
    println!("  Direction:   {}", signal.direction);
    println!("  Confidence:  {}%", signal.confidence);
    println!("  Trend:       {}", signal.trend);
    println!("  Strategy:    {}", signal.strategy_used);
    if let Some(entry) = entry {
        println!(
            "  Window:      {} → {}",
            entry.format("%H:%M:%S"),
            (entry + timeframe.duration()).format("%H:%M:%S")
        );
    }
    println!("  Indicators:  {}", signal.indicator_status);
    println!("  Reason:      {}", signal.justification);
    println!("{sep}\n");

    Ok(())
}

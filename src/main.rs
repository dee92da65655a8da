use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use platoon_board::api::state::AppState;
use platoon_board::config::AppConfig;
use platoon_board::formula::ScoringFormulaClient;
use platoon_board::leaderboard::LeaderboardAggregator;
use platoon_board::models::{resolve_range, View};
use platoon_board::store;

#[derive(Parser)]
#[command(name = "platoon-board")]
#[command(about = "Agent performance leaderboards by agent, depot and company")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); defaults to the config value
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Aggregate a leaderboard once and print it as JSON
    Leaderboard {
        /// leaders, depots or companies
        #[arg(long, default_value = "leaders")]
        view: String,

        /// Range start (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Range end (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// ISO week key, e.g. 2026-W07
        #[arg(long)]
        week: Option<String>,

        /// Only print the top N rows
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Fetch the active scoring formula
    Formula {
        #[arg(long)]
        battle_type: String,

        #[arg(long)]
        week_key: String,
    },
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)?;
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_tracing(level, cli.json_logs);

    tracing::info!("Starting platoon-board v{}", env!("CARGO_PKG_VERSION"));
    if !cli.config.exists() {
        tracing::info!("No config file at {:?}, using defaults", cli.config);
    }

    match cli.command {
        Commands::Serve { host, port } => {
            let store = store::from_config(&config.store)?;
            tracing::info!("Record store: {}", store.name());

            let formulas = ScoringFormulaClient::new(&config.formula)?;
            if !formulas.is_configured() {
                tracing::warn!("Scoring formula endpoint not configured");
            }

            let state = AppState {
                aggregator: Arc::new(LeaderboardAggregator::new(store)),
                formulas: Arc::new(formulas),
                cors_origin: config.server.cors_origin.clone(),
            };
            let app = platoon_board::api::build_router(state);

            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Leaderboard {
            view,
            start,
            end,
            week,
            limit,
        } => {
            let range = resolve_range(week.as_deref(), start.as_deref(), end.as_deref())?;
            let store = store::from_config(&config.store)?;
            let aggregator = LeaderboardAggregator::new(store);

            let mut board = aggregator.aggregate(range.as_ref(), View::parse(&view)).await?;
            if let Some(limit) = limit {
                board.truncate(limit);
            }

            println!("{}", serde_json::to_string_pretty(&board)?);
        }
        Commands::Formula {
            battle_type,
            week_key,
        } => {
            let client = ScoringFormulaClient::new(&config.formula)?;
            let response = client.get_active_formula(&battle_type, &week_key).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

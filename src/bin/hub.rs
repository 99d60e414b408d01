use std::sync::Arc;

use clap::Parser;
use tracing::{info, instrument, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};
use vm_telemetry::{
    actors::EngineHandle,
    api::{ApiConfig, ApiState, spawn_api_server},
    config::{Config, read_config_file},
    source::HttpSource,
    thresholds::ThresholdStore,
    util::get_source_token,
};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file
    #[arg(short)]
    file: String,
}

fn init(level: LevelFilter) {
    let filter = filter::Targets::new().with_targets(vec![
        ("vm_telemetry", level),
        ("vm_telemetry_hub", level),
        ("tower_http", LevelFilter::DEBUG.min(level)),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

fn log_level(config: &Config) -> LevelFilter {
    config
        .log_level
        .as_deref()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::TRACE)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let mut config = read_config_file(&args.file)?;
    init(log_level(&config));
    trace!("started with args: {args:?}");

    if config.source.token.is_none() {
        config.source.token = get_source_token();
    }

    run(config).await
}

#[instrument(skip_all)]
async fn run(config: Config) -> anyhow::Result<()> {
    let source = HttpSource::new(&config.source)?;
    let thresholds = ThresholdStore::new(config.thresholds.unwrap_or_default())?;

    info!(
        "monitoring entities from {} (history capacity {})",
        config.source.url, config.polling.history_capacity
    );

    let engine = EngineHandle::spawn(Arc::new(source), thresholds, config.polling);

    let api_config = ApiConfig::from_settings(config.api.as_ref());
    let addr = spawn_api_server(api_config, ApiState::new(engine.clone())).await?;
    info!("operator API available at http://{addr}/api/v1");

    tokio::signal::ctrl_c().await?;
    info!("received Ctrl-C, shutting down");

    engine.shutdown().await?;

    Ok(())
}

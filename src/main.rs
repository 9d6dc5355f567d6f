mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Commands};
use tracing::info;

use queuewatch::api::{self, state::AppState};
use queuewatch::backend;
use queuewatch::collector::{Aggregator, Scheduler};
use queuewatch::config::Config;
use queuewatch::observability::{self, CollectorMetrics};
use queuewatch::sink::{self, FanoutSink, LatestSink, MetricsSink};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    observability::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let mut config = load_config(args.config)?;
            if args.by_queue {
                config.collector.by_queue = true;
            }
            if let Some(interval) = args.interval {
                config.collector.interval = interval;
            }
            config.validate_for_run()?;
            run(config).await?
        }
        Commands::Collect(args) => {
            let mut config = load_config(args.config)?;
            if args.by_queue {
                config.collector.by_queue = true;
            }
            collect_once(config).await?
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<Config, AnyError> {
    let config = match path {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

fn build_aggregator(config: &Config) -> Result<Aggregator, AnyError> {
    let backend = backend::from_config(&config.backend)?;
    Ok(Aggregator::with_type_tag(
        backend,
        config.collector.type_tag.clone(),
    ))
}

async fn run(config: Config) -> Result<(), AnyError> {
    let aggregator = build_aggregator(&config)?;
    let metrics = Arc::new(CollectorMetrics::new());
    let latest = LatestSink::new();

    let mut sink = sink::from_config(&config.sink)?;
    if config.server.enabled {
        let sinks: Vec<Arc<dyn MetricsSink>> = vec![sink, Arc::new(latest.clone())];
        sink = Arc::new(FanoutSink::new(sinks));
    }

    let scheduler =
        Scheduler::new(aggregator, sink, config.scheduler_options())?.with_metrics(metrics.clone());
    let handle = scheduler.start();

    if config.server.enabled {
        let state = AppState::new(config.clone(), latest, metrics);
        api::run(config.server.bind_addr, state, api::shutdown_signal()).await?;
    } else {
        api::shutdown_signal().await;
    }

    info!("Stopping collector");
    handle.stop().await;
    Ok(())
}

async fn collect_once(config: Config) -> Result<(), AnyError> {
    let aggregator = build_aggregator(&config)?;
    let snapshot = aggregator.collect(config.collector.by_queue).await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

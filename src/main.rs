use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod data;
mod error;
mod scheduler;
mod util;

use config::Config;
use data::{Storage, models::ScheduledEvent};
use scheduler::tasks::Pipeline;
use util::{fetcher, mailer::SesNotifier, translator::GoogleTranslator};

#[derive(Debug, Parser)]
#[command(name = "feedtrans", about = "Translate a feed into an HTML report and mail the link")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a single invocation and exit
    Run {
        /// JSON scheduled-event payload to log with the run
        #[arg(long)]
        event: Option<PathBuf>,
    },
    /// Run an invocation on every tick of the configured cron schedule
    Schedule,
    /// Print a stored report, line by line
    Show {
        /// Object key, e.g. whats-new-html/anncmt-2024030514.html
        key: String,
    },
}

fn load_event(path: Option<&PathBuf>, region: &str) -> Result<ScheduledEvent> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read event {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("invalid event {}", path.display()))
        }
        None => Ok(ScheduledEvent::now(region)),
    }
}

async fn pipeline(config: Arc<Config>) -> Result<Pipeline> {
    let client = fetcher::client()?;
    let storage = Storage::s3(&config)?;
    let notifier = SesNotifier::new(&config.region).await;

    Ok(Pipeline::new(
        config,
        client.clone(),
        Arc::new(GoogleTranslator::with_client(client)),
        storage,
        Arc::new(notifier),
    ))
}

async fn schedule(config: Arc<Config>, pipeline: Arc<Pipeline>) -> Result<()> {
    let scheduler = JobScheduler::new().await?;
    let running = Arc::new(Mutex::new(()));
    let region = config.region.clone();

    scheduler
        .add(Job::new_async(config.schedule.as_str(), move |_uuid, _l| {
            let pipeline = pipeline.clone();
            let running = running.clone();
            let event = ScheduledEvent::now(&region);
            Box::pin(async move {
                let Ok(_guard) = running.try_lock() else {
                    warn!("Previous run still in progress, skipping this tick");
                    return;
                };
                if let Err(e) = pipeline.run(&event).await {
                    error!("Run failed: {:#}", e);
                }
            })
        })?)
        .await?;

    scheduler.start().await?;
    info!("Scheduled on \"{}\"", config.schedule);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Arc::new(Config::load()?);
    info!(
        "Loaded config: bucket={}, lang={}, dry_run={}",
        config.bucket, config.target_lang, config.dry_run
    );
    if let Some(endpoint) = &config.cache_endpoint {
        debug!("Cache endpoint {} is configured but not used", endpoint);
    }

    match cli.command.unwrap_or(Command::Schedule) {
        Command::Run { event } => {
            let event = load_event(event.as_ref(), &config.region)?;
            pipeline(config).await?.run(&event).await?;
        }
        Command::Schedule => {
            let pipeline = Arc::new(pipeline(config.clone()).await?);
            schedule(config, pipeline).await?;
        }
        Command::Show { key } => {
            let storage = Storage::s3(&config)?;
            for line in storage.read_lines(&key).await {
                println!("{line}");
            }
        }
    }

    Ok(())
}

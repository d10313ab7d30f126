use oncall_escalator::{
    config::Config,
    escalation::{EscalationProcessor, StaticFeatureGate},
    notifications::RecordingDispatcher,
    oncall::StaticScheduleResolver,
    scheduler::{RecheckScheduler, RecheckWorker},
    state::InMemoryStore,
};
use std::sync::Arc;
use tokio::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oncall_escalator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    tracing::info!("Starting oncall-escalator v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        oncall_escalator::metrics::init_metrics();
        tracing::info!("Prometheus metrics initialized");
    }

    // In-memory collaborators; real deployments swap these trait objects
    // for the surrounding platform's store, rotation service and pager.
    let store = Arc::new(InMemoryStore::new());
    let resolver = Arc::new(StaticScheduleResolver::new());
    let dispatcher = Arc::new(RecordingDispatcher::new());
    let gate = Arc::new(StaticFeatureGate::new(config.escalation.policies_enabled));

    let processor = Arc::new(
        EscalationProcessor::new(store.clone(), resolver, dispatcher, gate)
            .with_pass_timeout(Duration::from_secs(config.escalation.pass_timeout_secs)),
    );
    tracing::info!("Escalation processor initialized");

    let worker = Arc::new(
        RecheckWorker::new(store, processor).with_batch_size(config.escalation.batch_size),
    );

    let mut scheduler =
        RecheckScheduler::new(config.escalation.recheck_schedule.clone(), worker).await?;
    scheduler.start().await?;
    tracing::info!(
        schedule = %config.escalation.recheck_schedule,
        batch_size = config.escalation.batch_size,
        "Recheck scheduler started"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    scheduler.shutdown().await?;

    Ok(())
}

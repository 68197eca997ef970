use pivotwatch::config::Config;
use pivotwatch::services::{
    signal_log, ActiveInstruments, AllInstruments, MonitoringScheduler, SnapshotStore,
    SubscriptionStore, UpdatePipeline,
};
use pivotwatch::sources::HttpRateSource;
use pivotwatch::{AppState, INSTRUMENTS};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pivotwatch=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env());
    info!("Starting pivotwatch on {}:{}", config.host, config.port);
    info!(
        "Tracking {} pairs, strategy: CPR + {}/{} EMA",
        INSTRUMENTS.len(),
        config.indicators.ema_fast_period,
        config.indicators.ema_slow_period
    );

    let subscriptions = SubscriptionStore::load(&config.subscribers_file);
    let store = SnapshotStore::new();

    let source = Arc::new(HttpRateSource::new(
        config.spot_api_url.clone(),
        config.history_api_url.clone(),
        config.scheduler.fetch_timeout,
    ));
    let pipeline = Arc::new(UpdatePipeline::new(
        source,
        store.clone(),
        &config.indicators,
        config.scheduler.fetch_timeout,
    ));

    let active: Arc<dyn ActiveInstruments> = if config.track_all_instruments {
        Arc::new(AllInstruments)
    } else {
        info!("Updating subscribed pairs only");
        subscriptions.clone()
    };

    // Log signal transitions from committed snapshots
    signal_log::spawn(&store);

    // Start the monitoring loop
    let scheduler = MonitoringScheduler::new(pipeline, active, config.scheduler.clone());
    scheduler.spawn();

    let state = AppState {
        config: config.clone(),
        store,
        subscriptions,
        started_at: chrono::Utc::now(),
    };

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("pivotwatch listening on {}", addr);

    axum::serve(listener, pivotwatch::app(state)).await?;

    Ok(())
}

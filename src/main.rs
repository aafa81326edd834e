//! onsite-booking - Badge-driven booking controller
//!
//! This is the composition root that wires together all the components.

use onsite_booking::adapters::inbound::{LineCardReader, StatusServer};
use onsite_booking::adapters::outbound::{
    HttpBookingConfig, HttpBookingService, StatusBoard, SystemClock,
};
use onsite_booking::application::{Poller, Reconciler, ReconcilerSettings};
use onsite_booking::config::load_config;
use onsite_booking::domain::ports::{BookingService, Clock, StatusDisplay};
use onsite_booking::infrastructure::{shutdown_signal, ShutdownController};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    cfg.validate()?;

    tracing::info!(
        "starting onsite-booking resource={} api={}",
        cfg.resource_id,
        cfg.api_url
    );

    // ===== COMPOSITION ROOT =====

    // 1. Create outbound adapters
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let service: Arc<dyn BookingService> = Arc::new(HttpBookingService::new(
        HttpBookingConfig {
            api_url: cfg.api_url.clone(),
            access_token: cfg.access_token.clone(),
            lookahead: cfg.lookahead(),
            timeout: cfg.http_timeout(),
        },
        clock.clone(),
    )?);

    let board = Arc::new(StatusBoard::new(clock.clone()));
    let display: Arc<dyn StatusDisplay> = board.clone();

    let shutdown = ShutdownController::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    // 2. Optional status API
    if cfg.status_api_enabled {
        let server = StatusServer::new(cfg.status_api_listen_addr.clone(), board.clone());
        let server_shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = server.run(server_shutdown).await {
                tracing::error!("status API error: {:?}", e);
            }
        });
    }

    // 3. Application: derive state from the booking service, then loop
    let mut reconciler = Reconciler::new(
        service,
        display,
        ReconcilerSettings::from_config(&cfg),
        clock.now(),
    );
    reconciler.bootstrap(clock.now()).await;

    // 4. Inbound reader adapter and run
    let reader = LineCardReader::stdin();
    let mut poller = Poller::new(reconciler, reader, clock, cfg.poll_interval());
    poller.run(shutdown).await;

    tracing::info!("onsite-booking stopped");
    Ok(())
}

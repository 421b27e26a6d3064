use crate::api;
use crate::application::board::BoardState;
use crate::application::pipeline::RefreshPipeline;
use crate::application::scheduler::RefreshScheduler;
use crate::config::Settings;
use crate::feed::{HttpLapFeed, LapFeed};
use crate::Result;
use axum::Router;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Main application struct that coordinates all components
pub struct Application {
    settings: Settings,
    pipeline: Arc<RefreshPipeline>,
    scheduler: RefreshScheduler,
}

impl Application {
    #[instrument(skip_all)]
    pub fn new(settings: Settings) -> Result<Self> {
        let feed = HttpLapFeed::new(settings.feed_uri()?, settings.feed_timeout());
        info!(url = %feed.url(), "Using lap feed");
        Ok(Self::from_parts(settings, Arc::new(feed)))
    }

    /// Build around any feed implementation
    pub fn from_parts(settings: Settings, feed: Arc<dyn LapFeed>) -> Self {
        let board = Arc::new(BoardState::new());
        let pipeline = Arc::new(RefreshPipeline::new(feed, board));
        let scheduler =
            RefreshScheduler::new(Arc::clone(&pipeline), settings.refresh.interval_minutes);
        Self {
            settings,
            pipeline,
            scheduler,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn board(&self) -> &Arc<BoardState> {
        self.pipeline.board()
    }

    pub fn router(&self) -> Router {
        api::router(Arc::clone(&self.pipeline))
    }

    /// Start the refresh schedule and serve until ctrl-c
    #[instrument(skip(self))]
    pub async fn run(mut self) -> Result<()> {
        let address = self.settings.bind_address();
        let listener = tokio::net::TcpListener::bind(&address).await?;
        info!(%address, "Starting lap board server");

        self.scheduler.start();
        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await;

        self.shutdown().await;
        served?;
        info!("Lap board stopped");
        Ok(())
    }

    /// Tear down: later cycle results are discarded, then the schedule stops
    pub async fn shutdown(&mut self) {
        self.board().close();
        self.scheduler.stop().await;
    }

    pub fn scheduler_mut(&mut self) -> &mut RefreshScheduler {
        &mut self.scheduler
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

//! One fetch cycle: fetch, normalize, window, aggregate, apply

use crate::application::board::{ApplyOutcome, BoardSnapshot, BoardState, CycleId, DataSource};
use crate::domain::{
    aggregate, normalize_records, FallbackLapData, Lap, PipelineError, WeekWindow,
};
use crate::feed::LapFeed;
use chrono::Utc;
use derive_more::Display;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// What started a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RefreshTrigger {
    #[display("startup")]
    Startup,
    #[display("scheduled")]
    Scheduled,
    #[display("manual")]
    Manual,
}

impl RefreshTrigger {
    /// Only the startup cycle may substitute demo data for a failed fetch
    pub fn allows_fallback(self) -> bool {
        matches!(self, RefreshTrigger::Startup)
    }
}

/// Summary of a completed cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub cycle: CycleId,
    pub trigger: RefreshTrigger,
    pub source: DataSource,
    pub laps: usize,
    pub combos: usize,
    pub outcome: ApplyOutcome,
}

/// Runs fetch cycles against a feed and publishes them to the board
pub struct RefreshPipeline {
    feed: Arc<dyn LapFeed>,
    board: Arc<BoardState>,
}

impl RefreshPipeline {
    pub fn new(feed: Arc<dyn LapFeed>, board: Arc<BoardState>) -> Self {
        Self { feed, board }
    }

    pub fn board(&self) -> &Arc<BoardState> {
        &self.board
    }

    /// Run one cycle
    ///
    /// Failures are recorded on the board and returned. A startup cycle
    /// substitutes the demo dataset instead of failing.
    #[instrument(skip(self))]
    pub async fn run(&self, trigger: RefreshTrigger) -> Result<CycleReport, PipelineError> {
        let cycle = self.board.begin_cycle();

        let fetched = self.fetch_laps().await;
        let window = WeekWindow::current();
        let (laps, source) = match fetched {
            Ok(laps) => (laps, DataSource::Live),
            Err(error) if trigger.allows_fallback() => {
                warn!(%cycle, %error, "Lap feed unavailable, showing demo laps");
                let demo = FallbackLapData::records(&window, Utc::now());
                (normalize_records(&demo)?, DataSource::Fallback)
            }
            Err(error) => {
                warn!(%cycle, %trigger, %error, "Refresh failed");
                self.board.record_failure(cycle, &error);
                return Err(error);
            }
        };

        let combos = aggregate(&window, &laps);
        let report = CycleReport {
            cycle,
            trigger,
            source,
            laps: laps.len(),
            combos: combos.len(),
            outcome: ApplyOutcome::Applied,
        };
        let outcome = self.board.apply_snapshot(BoardSnapshot {
            cycle,
            source,
            window,
            combos,
            normalized_laps: laps.len(),
            fetched_at: Utc::now(),
        });

        info!(
            %cycle,
            %trigger,
            ?source,
            laps = report.laps,
            combos = report.combos,
            ?outcome,
            "Refresh cycle finished"
        );
        Ok(CycleReport { outcome, ..report })
    }

    async fn fetch_laps(&self) -> Result<Vec<Lap>, PipelineError> {
        let payload = self.feed.fetch().await?;
        normalize_records(&payload)
    }
}

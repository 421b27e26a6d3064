//! Shared board state
//!
//! `BoardState` is the single owner of what the board currently shows: the
//! latest applied snapshot, the selection and the last failure. Scheduled and
//! manual cycles may race; each cycle takes a [`CycleId`] when it begins and
//! its result is applied only when no newer cycle has been applied already.

use crate::domain::{Combo, ComboKey, PipelineError, Selection, SelectionError, WeekWindow};
use chrono::{DateTime, Utc};
use nutype::nutype;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Sequence number of a fetch cycle
#[nutype(derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Display,
    AsRef
))]
pub struct CycleId(u64);

/// Where a snapshot's laps came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Fallback,
}

/// Output of one successful cycle
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    pub cycle: CycleId,
    pub source: DataSource,
    pub window: WeekWindow,
    pub combos: Vec<Combo>,
    /// Laps that survived normalization, before windowing
    pub normalized_laps: usize,
    pub fetched_at: DateTime<Utc>,
}

/// What happened to a cycle's result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ApplyOutcome {
    Applied,
    /// A newer cycle was applied first
    Stale,
    /// Demo data never replaces live data
    FallbackSuppressed,
    /// The board was torn down while the cycle was in flight
    Closed,
}

impl ApplyOutcome {
    pub fn is_applied(self) -> bool {
        self == ApplyOutcome::Applied
    }
}

/// Consistent copy of the board for readers
#[derive(Debug, Clone, Default)]
pub struct BoardReading {
    pub snapshot: Option<Arc<BoardSnapshot>>,
    pub selection: Selection,
    pub last_error: Option<String>,
}

#[derive(Default)]
struct BoardInner {
    latest: Option<CycleId>,
    snapshot: Option<Arc<BoardSnapshot>>,
    selection: Selection,
    last_error: Option<String>,
    closed: bool,
}

impl BoardInner {
    fn admits(&self, cycle: CycleId) -> Option<ApplyOutcome> {
        if self.closed {
            return Some(ApplyOutcome::Closed);
        }
        match self.latest {
            Some(latest) if latest >= cycle => Some(ApplyOutcome::Stale),
            _ => None,
        }
    }
}

/// Owner of the displayed board
#[derive(Default)]
pub struct BoardState {
    issued: AtomicU64,
    inner: RwLock<BoardInner>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the id for a cycle that is about to fetch
    pub fn begin_cycle(&self) -> CycleId {
        CycleId::new(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Apply a successful cycle, reconciling the selection
    pub fn apply_snapshot(&self, snapshot: BoardSnapshot) -> ApplyOutcome {
        let mut inner = self.inner.write();
        if let Some(outcome) = inner.admits(snapshot.cycle) {
            debug!(cycle = %snapshot.cycle, ?outcome, "Discarding cycle result");
            return outcome;
        }
        let showing_live = inner
            .snapshot
            .as_ref()
            .is_some_and(|current| current.source == DataSource::Live);
        if snapshot.source == DataSource::Fallback && showing_live {
            debug!(cycle = %snapshot.cycle, "Keeping live data over fallback");
            return ApplyOutcome::FallbackSuppressed;
        }

        inner.latest = Some(snapshot.cycle);
        inner.selection = std::mem::take(&mut inner.selection).reconcile(&snapshot.combos);
        inner.snapshot = Some(Arc::new(snapshot));
        inner.last_error = None;
        ApplyOutcome::Applied
    }

    /// Record a failed cycle; the previous snapshot stays visible
    pub fn record_failure(&self, cycle: CycleId, error: &PipelineError) -> ApplyOutcome {
        let mut inner = self.inner.write();
        if let Some(outcome) = inner.admits(cycle) {
            debug!(%cycle, ?outcome, %error, "Discarding cycle failure");
            return outcome;
        }
        inner.latest = Some(cycle);
        inner.last_error = Some(error.to_string());
        ApplyOutcome::Applied
    }

    /// User selection of a combo present in the current snapshot
    pub fn select(&self, key: ComboKey) -> Result<Selection, SelectionError> {
        let mut inner = self.inner.write();
        let combos = inner
            .snapshot
            .as_ref()
            .map(|snapshot| snapshot.combos.as_slice())
            .unwrap_or_default();
        let selection = Selection::select(key, combos)?;
        inner.selection = selection.clone();
        Ok(selection)
    }

    pub fn read(&self) -> BoardReading {
        let inner = self.inner.read();
        BoardReading {
            snapshot: inner.snapshot.clone(),
            selection: inner.selection.clone(),
            last_error: inner.last_error.clone(),
        }
    }

    /// Stop accepting cycle results
    pub fn close(&self) {
        self.inner.write().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.read().closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_data::fixtures::lap;
    use crate::domain::test_data::{cars, drivers, tracks};
    use crate::domain::{aggregate, FeedError};
    use chrono::Duration;

    fn snapshot(cycle: CycleId, source: DataSource, combos: &[(&str, &str)]) -> BoardSnapshot {
        let window = WeekWindow::current();
        let at = window.start() + Duration::seconds(30);
        let laps: Vec<_> = combos
            .iter()
            .map(|(car, track)| lap(drivers::ALICE, car, track, 60.0, at))
            .collect();
        BoardSnapshot {
            cycle,
            source,
            window,
            combos: aggregate(&window, &laps),
            normalized_laps: laps.len(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_cycle_ids_increase() {
        let board = BoardState::new();
        let first = board.begin_cycle();
        let second = board.begin_cycle();
        assert!(second > first);
        assert_eq!(*first.as_ref(), 1);
    }

    #[test]
    fn test_first_snapshot_selects_top_combo() {
        let board = BoardState::new();
        let cycle = board.begin_cycle();
        let outcome = board.apply_snapshot(snapshot(
            cycle,
            DataSource::Live,
            &[(cars::TOYOTA_GR86, tracks::LIME_ROCK_PARK)],
        ));

        assert_eq!(outcome, ApplyOutcome::Applied);
        let reading = board.read();
        assert_eq!(
            reading.selection.key().map(ToString::to_string).as_deref(),
            Some("Toyota GR86 @ Lime Rock Park")
        );
    }

    #[test]
    fn test_older_cycle_does_not_overwrite_newer() {
        let board = BoardState::new();
        let slow = board.begin_cycle();
        let fast = board.begin_cycle();

        let fast_snapshot = snapshot(fast, DataSource::Live, &[(cars::MAZDA_MX5_CUP, tracks::OKAYAMA)]);
        assert!(board.apply_snapshot(fast_snapshot).is_applied());

        let slow_snapshot =
            snapshot(slow, DataSource::Live, &[(cars::TOYOTA_GR86, tracks::LIME_ROCK_PARK)]);
        assert_eq!(board.apply_snapshot(slow_snapshot), ApplyOutcome::Stale);

        let shown = board.read().snapshot.unwrap();
        assert_eq!(shown.cycle, fast);
    }

    #[test]
    fn test_fallback_never_replaces_live_data() {
        let board = BoardState::new();
        let live = board.begin_cycle();
        board.apply_snapshot(snapshot(live, DataSource::Live, &[(cars::TOYOTA_GR86, tracks::LIME_ROCK_PARK)]));

        let demo = board.begin_cycle();
        let outcome = board.apply_snapshot(snapshot(
            demo,
            DataSource::Fallback,
            &[(cars::MAZDA_MX5_CUP, tracks::OKAYAMA)],
        ));
        assert_eq!(outcome, ApplyOutcome::FallbackSuppressed);
        assert_eq!(board.read().snapshot.unwrap().source, DataSource::Live);
    }

    #[test]
    fn test_failure_keeps_previous_snapshot_and_reports_error() {
        let board = BoardState::new();
        let ok = board.begin_cycle();
        board.apply_snapshot(snapshot(ok, DataSource::Live, &[(cars::TOYOTA_GR86, tracks::LIME_ROCK_PARK)]));

        let failed = board.begin_cycle();
        let error = PipelineError::from(FeedError::Status { status: 500 });
        assert!(board.record_failure(failed, &error).is_applied());

        let reading = board.read();
        assert!(reading.snapshot.is_some());
        assert!(reading.last_error.unwrap().contains("500"));
    }

    #[test]
    fn test_success_clears_error() {
        let board = BoardState::new();
        let failed = board.begin_cycle();
        board.record_failure(failed, &PipelineError::from(FeedError::transport("timeout")));

        let ok = board.begin_cycle();
        board.apply_snapshot(snapshot(ok, DataSource::Live, &[]));
        assert!(board.read().last_error.is_none());
    }

    #[test]
    fn test_results_after_close_are_discarded() {
        let board = BoardState::new();
        let cycle = board.begin_cycle();
        board.close();

        let outcome = board.apply_snapshot(snapshot(
            cycle,
            DataSource::Live,
            &[(cars::TOYOTA_GR86, tracks::LIME_ROCK_PARK)],
        ));
        assert_eq!(outcome, ApplyOutcome::Closed);
        assert!(board.is_closed());
        assert!(board.read().snapshot.is_none());
    }

    #[test]
    fn test_failures_after_close_or_from_stale_cycles_are_discarded() {
        let board = BoardState::new();
        let slow = board.begin_cycle();
        let fast = board.begin_cycle();
        board.apply_snapshot(snapshot(fast, DataSource::Live, &[]));

        let error = PipelineError::from(FeedError::transport("timeout"));
        assert_eq!(board.record_failure(slow, &error), ApplyOutcome::Stale);
        assert!(board.read().last_error.is_none());

        let late = board.begin_cycle();
        board.close();
        assert_eq!(board.record_failure(late, &error), ApplyOutcome::Closed);
        assert!(board.read().last_error.is_none());
    }

    #[test]
    fn test_user_selection_survives_refresh() {
        let board = BoardState::new();
        let combos = [
            (cars::TOYOTA_GR86, tracks::LIME_ROCK_PARK),
            (cars::MAZDA_MX5_CUP, tracks::OKAYAMA),
        ];
        let first = board.begin_cycle();
        board.apply_snapshot(snapshot(first, DataSource::Live, &combos));

        let mazda = board.read().snapshot.unwrap().combos[1].key().clone();
        board.select(mazda.clone()).unwrap();

        let second = board.begin_cycle();
        board.apply_snapshot(snapshot(second, DataSource::Live, &combos));
        assert_eq!(board.read().selection, Selection::Selected(mazda));
    }

    #[test]
    fn test_selecting_before_any_data_is_rejected() {
        let board = BoardState::new();
        let key = ComboKey::new(
            crate::domain::CarName::try_new(cars::TOYOTA_GR86).unwrap(),
            crate::domain::TrackName::try_new(tracks::LIME_ROCK_PARK).unwrap(),
        );
        assert!(matches!(
            board.select(key),
            Err(SelectionError::UnknownCombo(_))
        ));
        assert_eq!(board.read().selection, Selection::NoSelection);
    }
}

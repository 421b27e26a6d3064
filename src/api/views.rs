//! JSON shapes served to the board UI

use crate::application::board::{BoardReading, DataSource};
use crate::domain::{format_lap_time, rank, Combo, ComboKey, RankedRow, WeekWindow};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardStatus {
    /// No cycle has completed yet
    Loading,
    /// A cycle completed with no laps this week
    Empty,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboView {
    pub key: ComboKey,
    pub label: String,
    pub lap_count: usize,
    pub latest_lap: Option<DateTime<Utc>>,
}

impl From<&Combo> for ComboView {
    fn from(combo: &Combo) -> Self {
        Self {
            key: combo.key().clone(),
            label: combo.key().to_string(),
            lap_count: combo.lap_count(),
            latest_lap: combo.latest_start(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    pub position: usize,
    pub driver_name: String,
    pub driver_rating: Option<i64>,
    pub lap_time: f64,
    pub lap_time_display: String,
    pub gap: String,
    pub delta_seconds: f64,
    pub start_time: DateTime<Utc>,
}

impl From<&RankedRow> for RowView {
    fn from(row: &RankedRow) -> Self {
        let seconds = row.lap.lap_time_seconds();
        Self {
            position: row.position,
            driver_name: row.lap.driver_name.to_string(),
            driver_rating: row.lap.driver_rating,
            lap_time: seconds,
            lap_time_display: format_lap_time(seconds),
            gap: row.gap().to_string(),
            delta_seconds: row.delta_seconds,
            start_time: row.lap.start_time,
        }
    }
}

/// Everything the board shows at one moment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub status: BoardStatus,
    pub source: Option<DataSource>,
    pub window: Option<WeekWindow>,
    pub combos: Vec<ComboView>,
    pub selected: Option<ComboKey>,
    pub rows: Vec<RowView>,
    pub last_updated: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl From<BoardReading> for BoardView {
    fn from(reading: BoardReading) -> Self {
        let Some(snapshot) = reading.snapshot else {
            return Self {
                status: BoardStatus::Loading,
                source: None,
                window: None,
                combos: Vec::new(),
                selected: None,
                rows: Vec::new(),
                last_updated: None,
                error: reading.last_error,
            };
        };

        let rows = reading
            .selection
            .resolve(&snapshot.combos)
            .map(|combo| rank(combo).iter().map(RowView::from).collect())
            .unwrap_or_default();
        let status = if snapshot.combos.is_empty() {
            BoardStatus::Empty
        } else {
            BoardStatus::Ready
        };

        Self {
            status,
            source: Some(snapshot.source),
            window: Some(snapshot.window),
            combos: snapshot.combos.iter().map(ComboView::from).collect(),
            selected: reading.selection.key().cloned(),
            rows,
            last_updated: Some(snapshot.fetched_at),
            error: reading.last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::board::{BoardSnapshot, BoardState};
    use crate::domain::test_data::fixtures::lap;
    use crate::domain::test_data::{cars, drivers, tracks};
    use crate::domain::{aggregate, LEADER_LABEL};
    use chrono::Duration;

    fn board_with(laps: &[(&str, f64)]) -> BoardState {
        let board = BoardState::new();
        let window = WeekWindow::current();
        let at = window.start() + Duration::minutes(5);
        let laps: Vec<_> = laps
            .iter()
            .map(|(driver, seconds)| {
                lap(driver, cars::TOYOTA_GR86, tracks::LIME_ROCK_PARK, *seconds, at)
            })
            .collect();
        let cycle = board.begin_cycle();
        board.apply_snapshot(BoardSnapshot {
            cycle,
            source: DataSource::Live,
            window,
            combos: aggregate(&window, &laps),
            normalized_laps: laps.len(),
            fetched_at: Utc::now(),
        });
        board
    }

    #[test]
    fn test_loading_before_first_cycle() {
        let view = BoardView::from(BoardState::new().read());
        assert_eq!(view.status, BoardStatus::Loading);
        assert!(view.rows.is_empty());
        assert!(view.last_updated.is_none());
    }

    #[test]
    fn test_empty_week_is_not_loading() {
        let view = BoardView::from(board_with(&[]).read());
        assert_eq!(view.status, BoardStatus::Empty);
        assert_eq!(view.source, Some(DataSource::Live));
        assert!(view.selected.is_none());
    }

    #[test]
    fn test_rows_rank_selected_combo() {
        let board = board_with(&[(drivers::BRUNO, 59.0), (drivers::ALICE, 58.8)]);
        let view = BoardView::from(board.read());

        assert_eq!(view.status, BoardStatus::Ready);
        assert_eq!(view.combos.len(), 1);
        assert_eq!(view.combos[0].label, "Toyota GR86 @ Lime Rock Park");
        assert_eq!(view.rows[0].driver_name, drivers::ALICE);
        assert_eq!(view.rows[0].gap, LEADER_LABEL);
        assert_eq!(view.rows[0].lap_time_display, "58.800");
        assert_eq!(view.rows[1].gap, "+0.200");
    }

    #[test]
    fn test_serialized_field_names() {
        let view = BoardView::from(board_with(&[(drivers::ALICE, 58.8)]).read());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["status"], "ready");
        assert_eq!(json["source"], "live");
        assert_eq!(json["selected"]["carName"], cars::TOYOTA_GR86);
        assert_eq!(json["rows"][0]["lapTimeDisplay"], "58.800");
        assert!(json["lastUpdated"].is_string());
    }
}

//! Fastest-lap ranking within one combo

use crate::domain::combo::Combo;
use crate::domain::lap::Lap;
use serde::Serialize;
use std::fmt;

/// Label rendered in place of a gap for the fastest lap
pub const LEADER_LABEL: &str = "Leader";

/// A lap with its position and gap to the fastest lap of the combo
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedRow {
    pub lap: Lap,
    /// 1-based position
    pub position: usize,
    /// Seconds behind position 1; exactly 0 for the leader
    pub delta_seconds: f64,
}

impl RankedRow {
    pub fn is_leader(&self) -> bool {
        self.position == 1
    }

    pub fn gap(&self) -> Gap {
        if self.is_leader() {
            Gap::Leader
        } else {
            Gap::Behind(self.delta_seconds)
        }
    }
}

/// How a row's gap to the leader is displayed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gap {
    Leader,
    Behind(f64),
}

impl fmt::Display for Gap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gap::Leader => f.write_str(LEADER_LABEL),
            Gap::Behind(seconds) => write!(f, "+{seconds:.3}"),
        }
    }
}

/// Rank the laps of a combo, fastest first
pub fn rank(combo: &Combo) -> Vec<RankedRow> {
    rank_laps(combo.laps())
}

/// Rank laps by ascending time
///
/// The sort is stable, so equal times keep the order they arrived in.
pub fn rank_laps(laps: &[Lap]) -> Vec<RankedRow> {
    let mut ordered: Vec<&Lap> = laps.iter().collect();
    ordered.sort_by(|a, b| a.lap_time.into_inner().total_cmp(&b.lap_time.into_inner()));

    let Some(leader) = ordered.first().map(|lap| lap.lap_time) else {
        return Vec::new();
    };

    ordered
        .into_iter()
        .enumerate()
        .map(|(index, lap)| RankedRow {
            lap: lap.clone(),
            position: index + 1,
            delta_seconds: if index == 0 {
                0.0
            } else {
                lap.lap_time.gap_to(leader)
            },
        })
        .collect()
}

/// Render seconds as `m:ss.mmm`, or `s.mmm` under a minute
pub fn format_lap_time(seconds: f64) -> String {
    let total_millis = (seconds.abs() * 1000.0).round() as u64;
    let sign = if seconds < 0.0 && total_millis > 0 { "-" } else { "" };
    let minutes = total_millis / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    if minutes > 0 {
        format!("{sign}{minutes}:{secs:02}.{millis:03}")
    } else {
        format!("{sign}{secs}.{millis:03}")
    }
}

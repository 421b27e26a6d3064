//! Car/track combinations
//!
//! Laps from the current week are grouped by the (car, track) pair they were
//! driven with. The busiest combination comes first, so it is the one shown
//! by default.

use crate::domain::lap::Lap;
use crate::domain::types::{CarName, TrackName};
use crate::domain::week_window::WeekWindow;
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Grouping key of a combo
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display("{car_name} @ {track_name}")]
#[serde(rename_all = "camelCase")]
pub struct ComboKey {
    pub car_name: CarName,
    pub track_name: TrackName,
}

impl ComboKey {
    pub fn new(car_name: CarName, track_name: TrackName) -> Self {
        Self {
            car_name,
            track_name,
        }
    }
}

/// All laps of one week sharing a car and a track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Combo {
    key: ComboKey,
    laps: Vec<Lap>,
}

impl Combo {
    pub fn key(&self) -> &ComboKey {
        &self.key
    }

    /// Laps in feed order
    pub fn laps(&self) -> &[Lap] {
        &self.laps
    }

    pub fn lap_count(&self) -> usize {
        self.laps.len()
    }

    /// Start time of the most recently started lap
    pub fn latest_start(&self) -> Option<DateTime<Utc>> {
        self.laps.iter().map(|lap| lap.start_time).max()
    }
}

/// Group the laps inside `window` into ordered combos
///
/// Combos are ordered by descending lap count, then by descending most recent
/// start time; any remaining tie keeps first-appearance order. Laps within a
/// combo keep their input order.
pub fn aggregate(window: &WeekWindow, laps: &[Lap]) -> Vec<Combo> {
    let mut combos: Vec<Combo> = Vec::new();
    let mut index_by_key: HashMap<ComboKey, usize> = HashMap::new();

    for lap in laps.iter().filter(|lap| window.contains(&lap.start_time)) {
        let key = lap.combo_key();
        match index_by_key.get(&key) {
            Some(&index) => combos[index].laps.push(lap.clone()),
            None => {
                index_by_key.insert(key.clone(), combos.len());
                combos.push(Combo {
                    key,
                    laps: vec![lap.clone()],
                });
            }
        }
    }

    combos.sort_by(|a, b| {
        b.lap_count()
            .cmp(&a.lap_count())
            .then_with(|| b.latest_start().cmp(&a.latest_start()))
    });
    combos
}

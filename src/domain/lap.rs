//! The normalized lap entity

use crate::domain::combo::ComboKey;
use crate::domain::types::{CarName, DriverName, LapSeconds, TrackName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One validated lap submission
///
/// Only the normalizer builds laps from feed data, so every `Lap` in the
/// pipeline has a finite time, non-empty car and track names and a real
/// start instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lap {
    pub driver_name: DriverName,
    pub lap_time: LapSeconds,
    pub driver_rating: Option<i64>,
    pub event_id: Option<String>,
    pub lap_id: Option<String>,
    pub track_temp_c: Option<f64>,
    pub track_usage_percent: Option<f64>,
    pub fuel_used_liters: Option<f64>,
    pub car_id: Option<String>,
    pub track_id: Option<String>,
    pub car_name: CarName,
    pub track_name: TrackName,
    pub start_time: DateTime<Utc>,
}

impl Lap {
    /// Lap with only the required fields set
    pub fn new(
        driver_name: DriverName,
        car_name: CarName,
        track_name: TrackName,
        lap_time: LapSeconds,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            driver_name,
            lap_time,
            driver_rating: None,
            event_id: None,
            lap_id: None,
            track_temp_c: None,
            track_usage_percent: None,
            fuel_used_liters: None,
            car_id: None,
            track_id: None,
            car_name,
            track_name,
            start_time,
        }
    }

    pub fn lap_time_seconds(&self) -> f64 {
        self.lap_time.into_inner()
    }

    /// The (car, track) pair this lap is grouped under
    pub fn combo_key(&self) -> ComboKey {
        ComboKey::new(self.car_name.clone(), self.track_name.clone())
    }
}

//! Illustrative laps shown when the feed is unreachable at startup
//!
//! The records use the same wire shape as the live feed and go through the
//! normal pipeline. Their start times are spread across the part of the
//! current week that has already elapsed, so they always land inside the
//! window the board is showing.

use crate::domain::normalizer::fields;
use crate::domain::week_window::WeekWindow;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

struct DemoLap {
    driver: &'static str,
    rating: &'static str,
    car: &'static str,
    track: &'static str,
    lap_time: &'static str,
}

const DEMO_LAPS: [DemoLap; 7] = [
    DemoLap {
        driver: "Sam Ortega",
        rating: "2875",
        car: "Toyota GR86",
        track: "Lime Rock Park",
        lap_time: "58.8125",
    },
    DemoLap {
        driver: "Priya Natarajan",
        rating: "2410",
        car: "Toyota GR86",
        track: "Lime Rock Park",
        lap_time: "59.103",
    },
    DemoLap {
        driver: "Jonas Lindqvist",
        rating: "1988",
        car: "Toyota GR86",
        track: "Lime Rock Park",
        lap_time: "60.245",
    },
    DemoLap {
        driver: "Mei Chen",
        rating: "3120",
        car: "Global Mazda MX-5 Cup",
        track: "Okayama International Circuit",
        lap_time: "101.382",
    },
    DemoLap {
        driver: "Tom Abernathy",
        rating: "1654",
        car: "Global Mazda MX-5 Cup",
        track: "Okayama International Circuit",
        lap_time: "102.004",
    },
    DemoLap {
        driver: "Lucia Ferraro",
        rating: "2233",
        car: "Porsche 911 GT3 Cup (992)",
        track: "Road Atlanta",
        lap_time: "75.617",
    },
    DemoLap {
        driver: "Sam Ortega",
        rating: "2875",
        car: "Toyota GR86",
        track: "Lime Rock Park",
        lap_time: "59.498",
    },
];

/// Source of the fixed demo dataset
pub struct FallbackLapData;

impl FallbackLapData {
    pub fn len() -> usize {
        DEMO_LAPS.len()
    }

    /// Demo records stamped inside `window`, no later than `now`
    pub fn records(window: &WeekWindow, now: DateTime<Utc>) -> Value {
        let latest = now.clamp(window.start(), window.end());
        let elapsed = latest.signed_duration_since(window.start());
        let slots = i32::try_from(DEMO_LAPS.len() + 1).unwrap_or(i32::MAX);

        let records = DEMO_LAPS
            .iter()
            .zip(1..)
            .map(|(demo, slot)| {
                let start_time = window.start() + elapsed * slot / slots;
                Self::record(demo, slot, start_time)
            })
            .collect();
        Value::Array(records)
    }

    fn record(demo: &DemoLap, slot: i32, start_time: DateTime<Utc>) -> Value {
        let mut record = Map::new();
        record.insert(fields::FULL_NAME.into(), json!(demo.driver));
        record.insert(fields::DRIVER_RATING.into(), json!(demo.rating));
        record.insert(fields::LAP_TIME.into(), json!(demo.lap_time));
        record.insert(fields::CAR_NAME.into(), json!(demo.car));
        record.insert(fields::TRACK_NAME.into(), json!(demo.track));
        record.insert(fields::EVENT_ID.into(), json!("demo"));
        record.insert(fields::LAP_ID.into(), json!(format!("demo-{slot}")));
        record.insert(
            fields::START_TIME.into(),
            json!(start_time.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        Value::Object(record)
    }
}

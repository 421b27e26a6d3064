//! Raw feed record normalization
//!
//! Turns the loosely typed JSON feed into validated [`Lap`] values. The feed
//! is best-effort: a record that fails validation is dropped and logged, and
//! the rest of the batch carries on. Only a payload that is not a list at all
//! is reported to the caller.

use crate::domain::errors::PipelineError;
use crate::domain::lap::Lap;
use crate::domain::types::{CarName, DriverName, LapSeconds, TrackName};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Placeholder used when a record carries no usable driver name
pub const UNKNOWN_DRIVER: &str = "Unknown driver";

/// Field names of the upstream feed
pub mod fields {
    pub const FULL_NAME: &str = "fullName";
    pub const LAP_TIME: &str = "lapTime";
    pub const DRIVER_RATING: &str = "driverRating";
    pub const EVENT_ID: &str = "eventId";
    pub const LAP_ID: &str = "lapId";
    pub const TRACK_TEMP: &str = "trackTemp";
    pub const TRACK_USAGE: &str = "trackUsage";
    pub const FUEL_USED: &str = "fuelUsed";
    pub const CAR_ID: &str = "carId";
    pub const TRACK_ID: &str = "trackId";
    pub const CAR_NAME: &str = "carName";
    pub const TRACK_NAME: &str = "trackName";
    pub const START_TIME: &str = "startTime";
}

/// Local date-time layouts accepted when a timestamp has no offset
const NAIVE_LAYOUTS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Why a single record was left out of the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecordRejection {
    #[error("record is not an object")]
    NotAnObject,
    #[error("lap time is missing or not a finite number")]
    InvalidLapTime,
    #[error("car name is missing")]
    MissingCarName,
    #[error("track name is missing")]
    MissingTrackName,
    #[error("start time is missing or unparseable")]
    InvalidStartTime,
}

/// Normalize a feed payload, reading offset-less timestamps as local time
pub fn normalize_records(payload: &Value) -> Result<Vec<Lap>, PipelineError> {
    normalize_records_in(payload, &Local)
}

/// Normalize a feed payload, reading offset-less timestamps in `zone`
pub fn normalize_records_in<Tz: TimeZone>(
    payload: &Value,
    zone: &Tz,
) -> Result<Vec<Lap>, PipelineError> {
    let records = payload
        .as_array()
        .ok_or_else(|| PipelineError::invalid_shape(payload))?;

    let laps: Vec<Lap> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| match normalize_record(record, zone) {
            Ok(lap) => Some(lap),
            Err(reason) => {
                debug!(index, %reason, "Dropping malformed lap record");
                None
            }
        })
        .collect();

    debug!(
        accepted = laps.len(),
        dropped = records.len() - laps.len(),
        "Normalized lap feed"
    );
    Ok(laps)
}

/// Validate one raw record
pub fn normalize_record<Tz: TimeZone>(record: &Value, zone: &Tz) -> Result<Lap, RecordRejection> {
    let record = record.as_object().ok_or(RecordRejection::NotAnObject)?;

    let lap_time = decimal_field(record, fields::LAP_TIME)
        .and_then(|seconds| LapSeconds::try_new(seconds).ok())
        .ok_or(RecordRejection::InvalidLapTime)?;
    let car_name = text_field(record, fields::CAR_NAME)
        .and_then(|name| CarName::try_new(name).ok())
        .ok_or(RecordRejection::MissingCarName)?;
    let track_name = text_field(record, fields::TRACK_NAME)
        .and_then(|name| TrackName::try_new(name).ok())
        .ok_or(RecordRejection::MissingTrackName)?;
    let start_time = text_field(record, fields::START_TIME)
        .and_then(|text| parse_start_time(&text, zone))
        .ok_or(RecordRejection::InvalidStartTime)?;
    let driver_name = text_field(record, fields::FULL_NAME)
        .and_then(|name| DriverName::try_new(name).ok())
        .unwrap_or_default();

    Ok(Lap {
        driver_name,
        lap_time,
        driver_rating: integer_field(record, fields::DRIVER_RATING),
        event_id: text_field(record, fields::EVENT_ID),
        lap_id: text_field(record, fields::LAP_ID),
        track_temp_c: decimal_field(record, fields::TRACK_TEMP),
        track_usage_percent: decimal_field(record, fields::TRACK_USAGE),
        fuel_used_liters: decimal_field(record, fields::FUEL_USED),
        car_id: text_field(record, fields::CAR_ID),
        track_id: text_field(record, fields::TRACK_ID),
        car_name,
        track_name,
        start_time,
    })
}

/// Parse a feed timestamp into a UTC instant
pub fn parse_start_time<Tz: TimeZone>(text: &str, zone: &Tz) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }
    if let Ok(instant) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(instant.with_timezone(&Utc));
    }

    let naive = NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })?;

    zone.from_local_datetime(&naive)
        .earliest()
        .map(|instant| instant.with_timezone(&Utc))
}

/// Non-empty trimmed text; numbers are accepted and rendered as text
fn text_field(record: &Map<String, Value>, name: &str) -> Option<String> {
    let text = match record.get(name)? {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Finite decimal from numeric text or a JSON number
fn decimal_field(record: &Map<String, Value>, name: &str) -> Option<f64> {
    let value = match record.get(name)? {
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        Value::Number(number) => number.as_f64()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// Whole number from integer text, a JSON integer, or an integral decimal
fn integer_field(record: &Map<String, Value>, name: &str) -> Option<i64> {
    if let Some(Value::String(text)) = record.get(name) {
        if let Ok(whole) = text.trim().parse::<i64>() {
            return Some(whole);
        }
    }
    if let Some(whole) = record.get(name).and_then(Value::as_i64) {
        return Some(whole);
    }

    let value = decimal_field(record, name)?;
    let in_range = value >= i64::MIN as f64 && value <= i64::MAX as f64;
    (value.fract() == 0.0 && in_range).then_some(value as i64)
}

//! Shared test data for lap board tests
//!
//! Feed-shaped records are built here so unit and integration tests exercise
//! the same wire format the normalizer sees in production.

use crate::domain::week_window::WeekWindow;
use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    SecondsFormat, TimeZone, Utc,
};
use serde_json::{json, Value};

/// Car names used in tests
pub mod cars {
    pub const TOYOTA_GR86: &str = "Toyota GR86";
    pub const MAZDA_MX5_CUP: &str = "Global Mazda MX-5 Cup";
    pub const PORSCHE_992_CUP: &str = "Porsche 911 GT3 Cup (992)";
}

/// Track names used in tests
pub mod tracks {
    pub const LIME_ROCK_PARK: &str = "Lime Rock Park";
    pub const OKAYAMA: &str = "Okayama International Circuit";
    pub const ROAD_ATLANTA: &str = "Road Atlanta";
}

/// Driver names used in tests
pub mod drivers {
    pub const ALICE: &str = "Alice Moreau";
    pub const BRUNO: &str = "Bruno Tanaka";
    pub const CHIDI: &str = "Chidi Okafor";
    pub const DANA: &str = "Dana Whitfield";
}

/// Lap times as the feed sends them (numeric strings)
pub mod lap_times {
    /// GR86 at Lime Rock, fastest first
    pub const LIME_ROCK_GR86: [&str; 3] = ["58.8125", "59.103", "60.245"];
    /// Expected gaps to the leader for `LIME_ROCK_GR86`
    pub const LIME_ROCK_GR86_GAPS: [f64; 3] = [0.0, 0.2905, 1.4325];
}

/// Format an instant the way the upstream feed does
pub fn feed_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A well-formed feed record with only the required fields
pub fn raw_record(
    driver: &str,
    car: &str,
    track: &str,
    lap_time: &str,
    start_time: DateTime<Utc>,
) -> Value {
    json!({
        "fullName": driver,
        "lapTime": lap_time,
        "carName": car,
        "trackName": track,
        "startTime": feed_timestamp(start_time),
    })
}

/// An instant guaranteed to fall inside the current week window
pub fn instant_in_current_week() -> DateTime<Utc> {
    let window = WeekWindow::current();
    let now = Utc::now();
    let elapsed = now.signed_duration_since(window.start());
    window.start() + elapsed / 2
}

/// US Eastern time with the 2024 daylight saving transitions
///
/// Daylight time runs from 2024-03-10 02:00 EST to 2024-11-03 02:00 EDT.
/// Every other instant, in any year, is standard time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EasternTime2024;

impl EasternTime2024 {
    fn standard() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap_or_else(|| Utc.fix())
    }

    fn daylight() -> FixedOffset {
        FixedOffset::west_opt(4 * 3600).unwrap_or_else(|| Utc.fix())
    }

    fn wall_clock(month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, month, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .unwrap_or_default()
    }
}

impl TimeZone for EasternTime2024 {
    type Offset = FixedOffset;

    fn from_offset(_offset: &FixedOffset) -> Self {
        EasternTime2024
    }

    fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
        self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
        let skipped = Self::wall_clock(3, 10, 2);
        let repeated = Self::wall_clock(11, 3, 1);
        let hour = Duration::hours(1);

        if *local >= skipped && *local < skipped + hour {
            LocalResult::None
        } else if *local >= repeated && *local < repeated + hour {
            LocalResult::Ambiguous(Self::daylight(), Self::standard())
        } else if *local >= skipped + hour && *local < repeated {
            LocalResult::Single(Self::daylight())
        } else {
            LocalResult::Single(Self::standard())
        }
    }

    fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
        self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
        let begins = Self::wall_clock(3, 10, 7);
        let ends = Self::wall_clock(11, 3, 6);
        if *utc >= begins && *utc < ends {
            Self::daylight()
        } else {
            Self::standard()
        }
    }
}

//! Sunday-to-Sunday week window
//!
//! The leaderboard only shows laps from the current calendar week, where a
//! week starts at local midnight on Sunday and ends at the next one, so
//! consecutive windows tile the timeline even across DST changes. The window
//! is recomputed from the clock every time it is needed.

use chrono::{DateTime, Datelike, Days, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

/// Half-open interval `[start, end)` spanning seven local calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl WeekWindow {
    pub const LENGTH_DAYS: u64 = 7;

    /// Window containing the current instant in the local time zone
    pub fn current() -> Self {
        Self::containing(&Local::now())
    }

    /// Window containing `instant`, using the instant's own time zone for
    /// midnight and day-of-week
    pub fn containing<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        let zone = instant.timezone();
        let today = instant.date_naive();
        let back = Days::new(u64::from(today.weekday().num_days_from_sunday()));
        let sunday = today.checked_sub_days(back).unwrap_or(today);

        let next_sunday = sunday
            .checked_add_days(Days::new(Self::LENGTH_DAYS))
            .unwrap_or(sunday);

        Self {
            start: local_midnight(&zone, sunday).with_timezone(&Utc),
            end: local_midnight(&zone, next_sunday).with_timezone(&Utc),
        }
    }

    /// Inclusive start
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant < self.end
    }
}

/// First instant of `date` in `zone`
///
/// Some zones skip midnight on DST change days; the first local time that
/// exists after midnight is used then.
fn local_midnight<Tz: TimeZone>(zone: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=12)
        .map(|quarter| midnight + Duration::minutes(15 * quarter))
        .find_map(|candidate| zone.from_local_datetime(&candidate).earliest())
        .unwrap_or_else(|| zone.from_utc_datetime(&midnight))
}
